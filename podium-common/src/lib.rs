//! Common types shared between podium-core and podium-cli

pub mod auth;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Deployment template available for cloning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Template {
    pub name: String,
}

impl Template {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Running instance cloned from a template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pod {
    pub name: String,
    /// The server only sends names, so fetched pods are stamped on arrival
    #[serde(default = "Utc::now")]
    pub deployed_at: DateTime<Utc>,
    /// Optimistic entry not yet confirmed by the server
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pending: bool,
}

impl Pod {
    /// Pod confirmed by the server
    pub fn confirmed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deployed_at: Utc::now(),
            pending: false,
        }
    }

    /// Placeholder inserted before the clone call settles
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deployed_at: Utc::now(),
            pending: true,
        }
    }
}

/// Virtual machine run state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VmStatus {
    Running,
    Stopped,
}

impl std::fmt::Display for VmStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Virtual machine as reported by the cluster inventory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VirtualMachine {
    pub id: String,
    pub name: String,
    pub node: String,
    pub vmid: u32,
    pub status: VmStatus,
}

/// Batched power action on virtual machines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmAction {
    Start,
    Stop,
}

impl VmAction {
    /// Status a VM ends up in once the action succeeded
    pub fn target_status(self) -> VmStatus {
        match self {
            Self::Start => VmStatus::Running,
            Self::Stop => VmStatus::Stopped,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

impl std::fmt::Display for VmAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.verb())
    }
}

/// `GET /api/proxmox/templates` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateList {
    #[serde(default)]
    pub templates: Option<Vec<Template>>,
}

/// Pod list response. The server names the field `templates` even though it holds pods.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodList {
    #[serde(default)]
    pub templates: Option<Vec<Pod>>,
}

/// `GET /api/admin/proxmox/virtualmachines` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VmList {
    #[serde(default)]
    pub virtual_machines: Option<Vec<VirtualMachine>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneRequest {
    pub template_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneResponse {
    pub pod_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePodRequest {
    pub pod_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmActionRequest {
    pub vmid: u32,
    pub node: String,
}

/// Structured error body returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub details: Option<String>,
}

/// Model error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Duplicate template name: {0}")]
    DuplicateTemplate(String),

    #[error("Duplicate virtual machine id: {0}")]
    DuplicateVmid(u32),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Template names identify templates, so a fetch may not repeat one
pub fn ensure_unique_templates(templates: &[Template]) -> Result<()> {
    let mut seen = HashSet::new();
    for template in templates {
        if !seen.insert(template.name.as_str()) {
            return Err(Error::DuplicateTemplate(template.name.clone()));
        }
    }
    Ok(())
}

/// vmids identify virtual machines within the cluster
pub fn ensure_unique_vmids(vms: &[VirtualMachine]) -> Result<()> {
    let mut seen = HashSet::new();
    for vm in vms {
        if !seen.insert(vm.vmid) {
            return Err(Error::DuplicateVmid(vm.vmid));
        }
    }
    Ok(())
}
