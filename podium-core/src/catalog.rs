//! Template catalog and pod collections
//!
//! Three independent collections refreshed from the control plane: the
//! template catalog, the pods owned by the signed-in user, and every pod in
//! the cluster. Each one fails on its own without blocking the others.
//! Optimistic entries from in-flight deploys and deletes are tracked by name
//! and survive refreshes that land before the action settles.

use crate::api::{ApiResult, RemoteApi};
use crate::error::ApiError;
use crate::fetch::FetchState;
use podium_common::{ensure_unique_templates, Pod, PodList, Template, TemplateList};
use std::collections::BTreeMap;
use tracing::warn;

/// Action in flight for a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOp {
    Deploy,
    Delete,
}

/// Pod taken out of the collections by an optimistic delete, with its positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedPod {
    pub name: String,
    user: Option<(usize, Pod)>,
    all: Option<(usize, Pod)>,
}

#[derive(Debug, Default)]
pub struct ResourceCatalogStore {
    templates: FetchState<Vec<Template>>,
    user_pods: FetchState<Vec<Pod>>,
    all_pods: FetchState<Vec<Pod>>,
    /// Last catalog that loaded, kept across in-flight and failed refreshes
    known_templates: Option<Vec<Template>>,
    pending: BTreeMap<String, PendingOp>,
}

impl ResourceCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn templates(&self) -> &FetchState<Vec<Template>> {
        &self.templates
    }

    pub fn user_pods(&self) -> &FetchState<Vec<Pod>> {
        &self.user_pods
    }

    pub fn all_pods(&self) -> &FetchState<Vec<Pod>> {
        &self.all_pods
    }

    pub async fn refresh_templates<A: RemoteApi + ?Sized>(&mut self, api: &A) {
        self.templates = FetchState::Loading;
        let result = api.list_templates().await;
        self.apply_templates(result);
    }

    pub async fn refresh_user_pods<A: RemoteApi + ?Sized>(&mut self, api: &A) {
        self.user_pods = FetchState::Loading;
        let result = api.list_user_pods().await;
        self.apply_user_pods(result);
    }

    pub async fn refresh_all_pods<A: RemoteApi + ?Sized>(&mut self, api: &A) {
        self.all_pods = FetchState::Loading;
        let result = api.list_all_pods().await;
        self.apply_all_pods(result);
    }

    /// Run the template and user pod fetches, plus the cluster-wide pod fetch
    /// when `include_cluster` is set, concurrently
    pub async fn refresh_all<A: RemoteApi + ?Sized>(&mut self, api: &A, include_cluster: bool) {
        self.templates = FetchState::Loading;
        self.user_pods = FetchState::Loading;
        if include_cluster {
            self.all_pods = FetchState::Loading;
        }

        let cluster = async {
            if include_cluster {
                Some(api.list_all_pods().await)
            } else {
                None
            }
        };
        let (templates, user_pods, all_pods) =
            tokio::join!(api.list_templates(), api.list_user_pods(), cluster);

        self.apply_templates(templates);
        self.apply_user_pods(user_pods);
        if let Some(all_pods) = all_pods {
            self.apply_all_pods(all_pods);
        }
    }

    /// Settle the template catalog. A null list is an empty catalog.
    pub fn apply_templates(&mut self, result: ApiResult<TemplateList>) {
        let result = result.and_then(|list| {
            let templates = list.templates.unwrap_or_default();
            ensure_unique_templates(&templates).map_err(|e| ApiError::invalid_response(200, e))?;
            Ok(templates)
        });
        match result {
            Ok(ref templates) => self.known_templates = Some(templates.clone()),
            Err(ref e) => warn!("Template refresh failed: {}", e),
        }
        self.templates.settle(result);
    }

    pub fn apply_user_pods(&mut self, result: ApiResult<PodList>) {
        if let Err(ref e) = result {
            warn!("User pod refresh failed: {}", e);
        }
        self.user_pods
            .settle(result.map(|list| list.templates.unwrap_or_default()));
        if let Some(pods) = self.user_pods.ready_mut() {
            reconcile_pending(&self.pending, pods);
        }
    }

    pub fn apply_all_pods(&mut self, result: ApiResult<PodList>) {
        if let Err(ref e) = result {
            warn!("Cluster pod refresh failed: {}", e);
        }
        self.all_pods
            .settle(result.map(|list| list.templates.unwrap_or_default()));
        if let Some(pods) = self.all_pods.ready_mut() {
            reconcile_pending(&self.pending, pods);
        }
    }

    /// True while any of the three fetches is in flight
    pub fn is_loading(&self) -> bool {
        self.templates.is_loading() || self.user_pods.is_loading() || self.all_pods.is_loading()
    }

    pub fn template_error(&self) -> Option<&str> {
        self.templates.error()
    }

    pub fn user_pods_error(&self) -> Option<&str> {
        self.user_pods.error()
    }

    pub fn all_pods_error(&self) -> Option<&str> {
        self.all_pods.error()
    }

    /// Whether any template fetch has ever succeeded
    pub fn catalog_known(&self) -> bool {
        self.known_templates.is_some()
    }

    /// Looks up the last catalog that loaded, so a refresh in flight or a
    /// failed one does not hide templates
    pub fn has_template(&self, name: &str) -> bool {
        self.known_templates
            .as_ref()
            .is_some_and(|templates| templates.iter().any(|t| t.name == name))
    }

    pub fn pending_op(&self, name: &str) -> Option<PendingOp> {
        self.pending.get(name).copied()
    }

    /// Whether a settled (non-placeholder) pod with this name is listed anywhere
    pub fn has_pod(&self, name: &str) -> bool {
        [&self.user_pods, &self.all_pods].iter().any(|state| {
            state
                .ready()
                .is_some_and(|pods| pods.iter().any(|p| p.name == name && !p.pending))
        })
    }

    /// Every user pod is also listed cluster-wide. Vacuously true unless both are loaded.
    pub fn user_pods_within_cluster(&self) -> bool {
        match (self.user_pods.ready(), self.all_pods.ready()) {
            (Some(user), Some(all)) => user
                .iter()
                .all(|pod| all.iter().any(|other| other.name == pod.name)),
            _ => true,
        }
    }

    pub(crate) fn insert_placeholder(&mut self, template_name: &str) {
        self.pending
            .insert(template_name.to_string(), PendingOp::Deploy);
        for pods in self.pod_collections_mut() {
            pods.push(Pod::placeholder(template_name));
        }
    }

    /// Swap the placeholder for the pod the server created
    pub(crate) fn confirm_placeholder(&mut self, template_name: &str, pod: &Pod) {
        self.pending.remove(template_name);
        for pods in self.pod_collections_mut() {
            let placeholder = pods
                .iter()
                .position(|p| p.pending && p.name == template_name);
            let already_listed = pods.iter().any(|p| !p.pending && p.name == pod.name);

            match (placeholder, already_listed) {
                (Some(idx), false) => pods[idx] = pod.clone(),
                (Some(idx), true) => {
                    pods.remove(idx);
                }
                (None, false) => pods.push(pod.clone()),
                (None, true) => {}
            }
        }
    }

    pub(crate) fn discard_placeholder(&mut self, template_name: &str) {
        self.pending.remove(template_name);
        for pods in self.pod_collections_mut() {
            pods.retain(|p| !(p.pending && p.name == template_name));
        }
    }

    pub(crate) fn remove_pod(&mut self, name: &str) -> RemovedPod {
        self.pending.insert(name.to_string(), PendingOp::Delete);
        RemovedPod {
            name: name.to_string(),
            user: take_pod(&mut self.user_pods, name),
            all: take_pod(&mut self.all_pods, name),
        }
    }

    /// Settle a delete. A rolled-back pod goes back where it was.
    pub(crate) fn finish_removal(&mut self, removed: RemovedPod, restore: bool) {
        self.pending.remove(&removed.name);
        if !restore {
            return;
        }
        if let (Some((idx, pod)), Some(pods)) = (removed.user, self.user_pods.ready_mut()) {
            restore_at(pods, idx, pod);
        }
        if let (Some((idx, pod)), Some(pods)) = (removed.all, self.all_pods.ready_mut()) {
            restore_at(pods, idx, pod);
        }
    }

    fn pod_collections_mut(&mut self) -> impl Iterator<Item = &mut Vec<Pod>> {
        [&mut self.user_pods, &mut self.all_pods]
            .into_iter()
            .filter_map(|state| state.ready_mut())
    }
}

fn take_pod(state: &mut FetchState<Vec<Pod>>, name: &str) -> Option<(usize, Pod)> {
    let pods = state.ready_mut()?;
    let idx = pods.iter().position(|p| p.name == name && !p.pending)?;
    Some((idx, pods.remove(idx)))
}

fn restore_at(pods: &mut Vec<Pod>, idx: usize, pod: Pod) {
    if pods.iter().any(|p| p.name == pod.name) {
        return;
    }
    let idx = idx.min(pods.len());
    pods.insert(idx, pod);
}

/// Re-apply in-flight actions on top of a freshly fetched collection
fn reconcile_pending(pending: &BTreeMap<String, PendingOp>, pods: &mut Vec<Pod>) {
    for (name, op) in pending {
        match op {
            PendingOp::Deploy => {
                if !pods.iter().any(|p| p.pending && &p.name == name) {
                    pods.push(Pod::placeholder(name.as_str()));
                }
            }
            PendingOp::Delete => pods.retain(|p| &p.name != name),
        }
    }
}
