//! Batched start/stop of selected virtual machines
//!
//! One request per selected vmid, all issued together and awaited as a
//! batch on the current task. The node for each vmid is looked up when the
//! batch starts; a vmid that has vanished from the inventory fails locally
//! without a request. The selection is cleared once the batch settles.

use crate::api::RemoteApi;
use crate::error::ActionError;
use crate::inventory::VmInventoryStore;
use futures::future::join_all;
use podium_common::{VmAction, VmActionRequest};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Which VMs get their projected status changed after a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchPolicy {
    /// Every VM whose own request succeeded
    #[default]
    PerVm,
    /// Only when every request in the batch succeeded, then all of them
    AllOrNothing,
}

/// Result of one vmid within a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmResult {
    Succeeded,
    Failed(String),
    /// Not in the inventory when the batch ran; no request was sent
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmOutcome {
    pub vmid: u32,
    pub result: VmResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub action: VmAction,
    pub outcomes: Vec<VmOutcome>,
    /// vmids whose projected status was changed
    pub changed: Vec<u32>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| o.result == VmResult::Succeeded)
    }

    pub fn failures(&self) -> impl Iterator<Item = &VmOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.result != VmResult::Succeeded)
    }

    /// Notification text for a batch with failures
    pub fn failure_message(&self) -> Option<String> {
        if self.is_success() {
            return None;
        }
        let details: Vec<String> = self
            .failures()
            .map(|o| match &o.result {
                VmResult::Failed(msg) => format!("{} ({})", o.vmid, msg),
                VmResult::Missing => format!("{} (not in inventory)", o.vmid),
                VmResult::Succeeded => o.vmid.to_string(),
            })
            .collect();
        Some(format!(
            "Failed to {} VMs: {}",
            self.action.verb(),
            details.join(", ")
        ))
    }
}

#[derive(Debug, Clone, Default)]
pub struct VmLifecycleController {
    policy: BatchPolicy,
}

impl VmLifecycleController {
    pub fn new(policy: BatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }

    pub async fn start_selected<A: RemoteApi + ?Sized>(
        &self,
        inventory: &mut VmInventoryStore,
        api: &A,
    ) -> Result<BatchReport, ActionError> {
        self.run_batch(inventory, api, VmAction::Start).await
    }

    pub async fn stop_selected<A: RemoteApi + ?Sized>(
        &self,
        inventory: &mut VmInventoryStore,
        api: &A,
    ) -> Result<BatchReport, ActionError> {
        self.run_batch(inventory, api, VmAction::Stop).await
    }

    async fn run_batch<A: RemoteApi + ?Sized>(
        &self,
        inventory: &mut VmInventoryStore,
        api: &A,
        action: VmAction,
    ) -> Result<BatchReport, ActionError> {
        if inventory.selection().is_empty() {
            return Err(ActionError::EmptySelection(action));
        }

        let vmids: Vec<u32> = inventory.selection().iter().copied().collect();
        info!("Requesting {} of VMs {:?}", action, vmids);

        let requests: Vec<Option<VmActionRequest>> = vmids
            .iter()
            .map(|&vmid| {
                inventory.find(vmid).map(|vm| VmActionRequest {
                    vmid,
                    node: vm.node.clone(),
                })
            })
            .collect();

        let results = join_all(requests.iter().map(|request| async move {
            match request {
                Some(request) => match api.vm_action(action, request).await {
                    Ok(()) => VmResult::Succeeded,
                    Err(e) => VmResult::Failed(e.to_string()),
                },
                None => VmResult::Missing,
            }
        }))
        .await;

        let outcomes: Vec<VmOutcome> = vmids
            .iter()
            .zip(results)
            .map(|(&vmid, result)| VmOutcome { vmid, result })
            .collect();

        let succeeded: Vec<u32> = outcomes
            .iter()
            .filter(|o| o.result == VmResult::Succeeded)
            .map(|o| o.vmid)
            .collect();

        let to_project = match self.policy {
            BatchPolicy::PerVm => succeeded,
            BatchPolicy::AllOrNothing if succeeded.len() == outcomes.len() => succeeded,
            BatchPolicy::AllOrNothing => Vec::new(),
        };
        let changed = inventory.project_status(&to_project, action.target_status());

        inventory.clear_selection();

        let report = BatchReport {
            action,
            outcomes,
            changed,
        };
        match report.failure_message() {
            Some(message) => warn!("{}", message),
            None => crate::log_action!(action.verb(), format!("{:?}", vmids)),
        }
        Ok(report)
    }
}
