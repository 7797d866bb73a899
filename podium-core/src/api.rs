//! Remote virtualization API boundary
//!
//! `RemoteApi` is the fixed request/response contract with the control
//! plane. `HttpApiClient` implements it over reqwest with a per-process
//! cookie jar, so the session cookie set at login rides along on every call.

use crate::error::{classify_failure, ApiError};
use async_trait::async_trait;
use podium_common::auth::{LoginRequest, Profile, SessionCheck};
use podium_common::{
    CloneRequest, CloneResponse, DeletePodRequest, PodList, TemplateList, VmAction,
    VmActionRequest, VmList,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

pub const LOGIN_PATH: &str = "/api/login";
pub const LOGOUT_PATH: &str = "/api/logout";
pub const SESSION_PATH: &str = "/api/session";
pub const PROFILE_PATH: &str = "/api/profile";
pub const TEMPLATES_PATH: &str = "/api/proxmox/templates";
pub const CLONE_PATH: &str = "/api/proxmox/templates/clone";
pub const DELETE_POD_PATH: &str = "/api/proxmox/pods/delete";
pub const USER_PODS_PATH: &str = "/api/proxmox/pods";
pub const ALL_PODS_PATH: &str = "/api/admin/proxmox/pods/all";
pub const VMS_PATH: &str = "/api/admin/proxmox/virtualmachines";
pub const VM_START_PATH: &str = "/api/admin/proxmox/virtualmachines/start";
pub const VM_STOP_PATH: &str = "/api/admin/proxmox/virtualmachines/shutdown";

/// Calls the client makes against the control plane
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> ApiResult<()>;

    async fn logout(&self) -> ApiResult<()>;

    async fn session(&self) -> ApiResult<SessionCheck>;

    async fn profile(&self) -> ApiResult<Profile>;

    async fn list_templates(&self) -> ApiResult<TemplateList>;

    async fn clone_template(&self, request: &CloneRequest) -> ApiResult<CloneResponse>;

    async fn delete_pod(&self, request: &DeletePodRequest) -> ApiResult<()>;

    async fn list_user_pods(&self) -> ApiResult<PodList>;

    async fn list_all_pods(&self) -> ApiResult<PodList>;

    async fn list_vms(&self) -> ApiResult<VmList>;

    async fn vm_action(&self, action: VmAction, request: &VmActionRequest) -> ApiResult<()>;
}

/// Path of the power endpoint for an action
pub fn vm_action_path(action: VmAction) -> &'static str {
    match action {
        VmAction::Start => VM_START_PATH,
        VmAction::Stop => VM_STOP_PATH,
    }
}

/// reqwest-backed API client
pub struct HttpApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApiClient {
    /// Create a client; `timeout` is the only deadline anywhere in the stack
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return the status and body of a 2xx response
    async fn execute(&self, request: reqwest::RequestBuilder) -> ApiResult<(u16, String)> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "API request failed");
            return Err(classify_failure(status.as_u16(), &body));
        }

        Ok((status.as_u16(), body))
    }

    fn decode<T: DeserializeOwned>(status: u16, body: &str) -> ApiResult<T> {
        serde_json::from_str(body).map_err(|e| ApiError::invalid_response(status, e))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        crate::log_api_request!("GET", path);
        let (status, body) = self.execute(self.client.get(self.url(path))).await?;
        Self::decode(status, &body)
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        crate::log_api_request!("POST", path);
        let (status, text) = self
            .execute(self.client.post(self.url(path)).json(body))
            .await?;
        Self::decode(status, &text)
    }

    /// POST whose success carries no payload the client needs
    async fn post_empty<B: Serialize + ?Sized>(&self, path: &str, body: Option<&B>) -> ApiResult<()> {
        crate::log_api_request!("POST", path);
        let mut request = self.client.post(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteApi for HttpApiClient {
    async fn login(&self, request: &LoginRequest) -> ApiResult<()> {
        self.post_empty(LOGIN_PATH, Some(request)).await
    }

    async fn logout(&self) -> ApiResult<()> {
        self.post_empty::<()>(LOGOUT_PATH, None).await
    }

    async fn session(&self) -> ApiResult<SessionCheck> {
        self.get(SESSION_PATH).await
    }

    async fn profile(&self) -> ApiResult<Profile> {
        self.get(PROFILE_PATH).await
    }

    async fn list_templates(&self) -> ApiResult<TemplateList> {
        self.get(TEMPLATES_PATH).await
    }

    async fn clone_template(&self, request: &CloneRequest) -> ApiResult<CloneResponse> {
        self.post(CLONE_PATH, request).await
    }

    async fn delete_pod(&self, request: &DeletePodRequest) -> ApiResult<()> {
        self.post_empty(DELETE_POD_PATH, Some(request)).await
    }

    async fn list_user_pods(&self) -> ApiResult<PodList> {
        self.get(USER_PODS_PATH).await
    }

    async fn list_all_pods(&self) -> ApiResult<PodList> {
        self.get(ALL_PODS_PATH).await
    }

    async fn list_vms(&self) -> ApiResult<VmList> {
        self.get(VMS_PATH).await
    }

    async fn vm_action(&self, action: VmAction, request: &VmActionRequest) -> ApiResult<()> {
        self.post_empty(vm_action_path(action), Some(request)).await
    }
}
