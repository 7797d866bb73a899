//! Clone and delete of pods with optimistic updates
//!
//! Each action runs in two halves around the network call: `begin_*` applies
//! the optimistic change and hands back a ticket, `finish_*` reconciles the
//! catalog with the server's answer. `deploy` and `delete` chain the two for
//! callers that simply await the whole action.

use crate::api::{ApiResult, RemoteApi};
use crate::catalog::{RemovedPod, ResourceCatalogStore};
use crate::error::ActionError;
use podium_common::{CloneRequest, CloneResponse, DeletePodRequest, Pod};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What a failed delete does to the optimistically removed pod
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeletePolicy {
    /// Put the pod back, like a failed deploy removes its placeholder
    #[default]
    Rollback,
    /// Leave the pod out of the collections until the next refresh
    KeepRemoved,
}

/// In-flight deploy
#[derive(Debug)]
pub struct DeployTicket {
    template_name: String,
}

impl DeployTicket {
    pub fn template_name(&self) -> &str {
        &self.template_name
    }
}

/// In-flight delete
#[derive(Debug)]
pub struct DeleteTicket {
    removed: RemovedPod,
}

impl DeleteTicket {
    pub fn pod_name(&self) -> &str {
        &self.removed.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Deployed(Pod),
    /// Another deploy or delete for the name is still in flight; nothing was sent
    AlreadyPending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(String),
    AlreadyPending,
}

#[derive(Debug, Clone, Default)]
pub struct DeploymentOrchestrator {
    delete_policy: DeletePolicy,
}

impl DeploymentOrchestrator {
    pub fn new(delete_policy: DeletePolicy) -> Self {
        Self { delete_policy }
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    /// Insert a pending placeholder into both pod collections.
    /// `Ok(None)` means an action for the name is already in flight.
    pub fn begin_deploy(
        &self,
        catalog: &mut ResourceCatalogStore,
        template_name: &str,
    ) -> Result<Option<DeployTicket>, ActionError> {
        if !catalog.catalog_known() {
            return Err(ActionError::CatalogUnavailable(template_name.to_string()));
        }
        if !catalog.has_template(template_name) {
            return Err(ActionError::UnknownTemplate(template_name.to_string()));
        }
        if catalog.pending_op(template_name).is_some() {
            info!("Deploy of {} already pending, ignoring", template_name);
            return Ok(None);
        }

        catalog.insert_placeholder(template_name);
        Ok(Some(DeployTicket {
            template_name: template_name.to_string(),
        }))
    }

    /// Replace the placeholder with the server's pod, or remove it on failure
    pub fn finish_deploy(
        &self,
        catalog: &mut ResourceCatalogStore,
        ticket: DeployTicket,
        result: ApiResult<CloneResponse>,
    ) -> Result<Pod, ActionError> {
        match result {
            Ok(response) => {
                let pod = Pod::confirmed(response.pod_name);
                catalog.confirm_placeholder(&ticket.template_name, &pod);
                crate::log_action!("deploy", ticket.template_name, pod = pod.name.as_str());
                Ok(pod)
            }
            Err(e) => {
                warn!("Deploy of {} failed, rolling back: {}", ticket.template_name, e);
                catalog.discard_placeholder(&ticket.template_name);
                Err(ActionError::Deploy(e))
            }
        }
    }

    pub async fn deploy<A: RemoteApi + ?Sized>(
        &self,
        catalog: &mut ResourceCatalogStore,
        api: &A,
        template_name: &str,
    ) -> Result<DeployOutcome, ActionError> {
        let Some(ticket) = self.begin_deploy(catalog, template_name)? else {
            return Ok(DeployOutcome::AlreadyPending);
        };

        let request = CloneRequest {
            template_name: template_name.to_string(),
        };
        let result = api.clone_template(&request).await;

        self.finish_deploy(catalog, ticket, result)
            .map(DeployOutcome::Deployed)
    }

    /// Remove the pod from both collections ahead of the call.
    /// `Ok(None)` means an action for the name is already in flight.
    pub fn begin_delete(
        &self,
        catalog: &mut ResourceCatalogStore,
        pod_name: &str,
    ) -> Result<Option<DeleteTicket>, ActionError> {
        if catalog.pending_op(pod_name).is_some() {
            info!("Delete of {} already pending, ignoring", pod_name);
            return Ok(None);
        }
        if !catalog.has_pod(pod_name) {
            return Err(ActionError::UnknownPod(pod_name.to_string()));
        }

        let removed = catalog.remove_pod(pod_name);
        Ok(Some(DeleteTicket { removed }))
    }

    pub fn finish_delete(
        &self,
        catalog: &mut ResourceCatalogStore,
        ticket: DeleteTicket,
        result: ApiResult<()>,
    ) -> Result<String, ActionError> {
        let name = ticket.removed.name.clone();
        match result {
            Ok(()) => {
                catalog.finish_removal(ticket.removed, false);
                crate::log_action!("delete", name);
                Ok(name)
            }
            Err(e) => {
                let restore = self.delete_policy == DeletePolicy::Rollback;
                if restore {
                    warn!("Delete of {} failed, restoring: {}", name, e);
                } else {
                    warn!("Delete of {} failed, leaving it removed: {}", name, e);
                }
                catalog.finish_removal(ticket.removed, restore);
                Err(ActionError::Delete(e))
            }
        }
    }

    pub async fn delete<A: RemoteApi + ?Sized>(
        &self,
        catalog: &mut ResourceCatalogStore,
        api: &A,
        pod_name: &str,
    ) -> Result<DeleteOutcome, ActionError> {
        let Some(ticket) = self.begin_delete(catalog, pod_name)? else {
            return Ok(DeleteOutcome::AlreadyPending);
        };

        let request = DeletePodRequest {
            pod_id: pod_name.to_string(),
        };
        let result = api.delete_pod(&request).await;

        self.finish_delete(catalog, ticket, result)
            .map(DeleteOutcome::Deleted)
    }
}
