//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use podium_common::auth::{LoginRequest, Profile, SessionCheck};
use podium_common::{
    CloneRequest, CloneResponse, DeletePodRequest, Pod, PodList, Template, TemplateList,
    VirtualMachine, VmAction, VmActionRequest, VmList, VmStatus,
};
use podium_core::{classify_failure, ApiError, ApiResult, RemoteApi};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted in-memory control plane that records every call
pub struct MockApi {
    pub login: ApiResult<()>,
    pub logout: ApiResult<()>,
    pub session: ApiResult<SessionCheck>,
    pub profile: ApiResult<Profile>,
    pub templates: ApiResult<TemplateList>,
    pub clone: ApiResult<CloneResponse>,
    pub delete: ApiResult<()>,
    pub user_pods: ApiResult<PodList>,
    pub all_pods: ApiResult<PodList>,
    pub vms: ApiResult<VmList>,
    /// Per-vmid failures for start/stop; vmids not listed succeed
    pub vm_failures: HashMap<u32, ApiError>,
    pub calls: Mutex<Vec<String>>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl Default for MockApi {
    fn default() -> Self {
        Self {
            login: Ok(()),
            logout: Ok(()),
            session: Ok(SessionCheck { is_admin: false }),
            profile: Ok(Profile {
                message: "alice".to_string(),
            }),
            templates: Ok(TemplateList { templates: None }),
            clone: Err(server_error("clone not scripted")),
            delete: Ok(()),
            user_pods: Ok(PodList { templates: None }),
            all_pods: Ok(PodList { templates: None }),
            vms: Ok(VmList {
                virtual_machines: None,
            }),
            vm_failures: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admin() -> Self {
        Self {
            session: Ok(SessionCheck { is_admin: true }),
            ..Self::default()
        }
    }

    pub fn with_templates(mut self, names: &[&str]) -> Self {
        self.templates = Ok(TemplateList {
            templates: Some(names.iter().map(|n| Template::new(*n)).collect()),
        });
        self
    }

    pub fn with_user_pods(mut self, names: &[&str]) -> Self {
        self.user_pods = Ok(pod_list(names));
        self
    }

    pub fn with_all_pods(mut self, names: &[&str]) -> Self {
        self.all_pods = Ok(pod_list(names));
        self
    }

    pub fn with_vms(mut self, vms: Vec<VirtualMachine>) -> Self {
        self.vms = Ok(VmList {
            virtual_machines: Some(vms),
        });
        self
    }

    pub fn with_clone(mut self, result: ApiResult<CloneResponse>) -> Self {
        self.clone = result;
        self
    }

    pub fn failing_vm(mut self, vmid: u32, err: ApiError) -> Self {
        self.vm_failures.insert(vmid, err);
        self
    }

    /// Every call so far, as "METHOD path [argument]"
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    /// Highest number of calls that were in flight at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    /// Hold the call open across one scheduler turn so overlapping calls are visible
    async fn in_flight<T>(&self, result: T) -> T {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl RemoteApi for MockApi {
    async fn login(&self, request: &LoginRequest) -> ApiResult<()> {
        self.record(format!("POST /api/login {}", request.username));
        self.login.clone()
    }

    async fn logout(&self) -> ApiResult<()> {
        self.record("POST /api/logout");
        self.logout.clone()
    }

    async fn session(&self) -> ApiResult<SessionCheck> {
        self.record("GET /api/session");
        self.session.clone()
    }

    async fn profile(&self) -> ApiResult<Profile> {
        self.record("GET /api/profile");
        self.profile.clone()
    }

    async fn list_templates(&self) -> ApiResult<TemplateList> {
        self.record("GET /api/proxmox/templates");
        self.in_flight(self.templates.clone()).await
    }

    async fn clone_template(&self, request: &CloneRequest) -> ApiResult<CloneResponse> {
        self.record(format!(
            "POST /api/proxmox/templates/clone {}",
            request.template_name
        ));
        self.clone.clone()
    }

    async fn delete_pod(&self, request: &DeletePodRequest) -> ApiResult<()> {
        self.record(format!("POST /api/proxmox/pods/delete {}", request.pod_id));
        self.delete.clone()
    }

    async fn list_user_pods(&self) -> ApiResult<PodList> {
        self.record("GET /api/proxmox/pods");
        self.in_flight(self.user_pods.clone()).await
    }

    async fn list_all_pods(&self) -> ApiResult<PodList> {
        self.record("GET /api/admin/proxmox/pods/all");
        self.in_flight(self.all_pods.clone()).await
    }

    async fn list_vms(&self) -> ApiResult<VmList> {
        self.record("GET /api/admin/proxmox/virtualmachines");
        self.in_flight(self.vms.clone()).await
    }

    async fn vm_action(&self, action: VmAction, request: &VmActionRequest) -> ApiResult<()> {
        self.record(format!(
            "POST {} {}@{}",
            podium_core::api::vm_action_path(action),
            request.vmid,
            request.node
        ));
        let result = match self.vm_failures.get(&request.vmid) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        };
        self.in_flight(result).await
    }
}

pub fn pod_list(names: &[&str]) -> PodList {
    PodList {
        templates: Some(names.iter().map(|n| Pod::confirmed(*n)).collect()),
    }
}

pub fn server_error(message: &str) -> ApiError {
    classify_failure(500, &format!(r#"{{"error": "{}"}}"#, message))
}

pub fn vm(vmid: u32, node: &str, status: VmStatus) -> VirtualMachine {
    VirtualMachine {
        id: format!("qemu/{}", vmid),
        name: format!("vm-{}", vmid),
        node: node.to_string(),
        vmid,
        status,
    }
}

pub fn pod_names(pods: Option<&Vec<Pod>>) -> Vec<(String, bool)> {
    pods.map(|pods| pods.iter().map(|p| (p.name.clone(), p.pending)).collect())
        .unwrap_or_default()
}
