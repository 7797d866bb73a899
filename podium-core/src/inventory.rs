//! Virtual machine inventory and selection

use crate::api::{ApiResult, RemoteApi};
use crate::error::ApiError;
use crate::fetch::FetchState;
use podium_common::{ensure_unique_vmids, VirtualMachine, VmList, VmStatus};
use std::collections::BTreeSet;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct VmInventoryStore {
    vms: FetchState<Vec<VirtualMachine>>,
    selection: BTreeSet<u32>,
}

impl VmInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vms(&self) -> &FetchState<Vec<VirtualMachine>> {
        &self.vms
    }

    pub fn is_loading(&self) -> bool {
        self.vms.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.vms.error()
    }

    /// Replace the whole VM set with a fresh fetch
    pub async fn refresh<A: RemoteApi + ?Sized>(&mut self, api: &A) {
        self.vms = FetchState::Loading;
        let result = api.list_vms().await;
        self.apply(result);
    }

    pub fn apply(&mut self, result: ApiResult<VmList>) {
        let result = result.and_then(|list| {
            let vms = list.virtual_machines.unwrap_or_default();
            ensure_unique_vmids(&vms).map_err(|e| ApiError::invalid_response(200, e))?;
            Ok(vms)
        });
        if let Err(ref e) = result {
            warn!("VM inventory refresh failed: {}", e);
        }
        self.vms.settle(result);
    }

    pub fn find(&self, vmid: u32) -> Option<&VirtualMachine> {
        self.vms.ready()?.iter().find(|vm| vm.vmid == vmid)
    }

    pub fn selection(&self) -> &BTreeSet<u32> {
        &self.selection
    }

    /// Add a vmid to the selection. Unknown vmids are rejected.
    pub fn select(&mut self, vmid: u32) -> bool {
        if self.find(vmid).is_none() {
            debug!("Ignoring selection of unknown vmid {}", vmid);
            return false;
        }
        self.selection.insert(vmid);
        true
    }

    pub fn deselect(&mut self, vmid: u32) -> bool {
        self.selection.remove(&vmid)
    }

    /// Flip membership; returns whether the vmid is selected afterwards
    pub fn toggle(&mut self, vmid: u32) -> bool {
        if self.selection.remove(&vmid) {
            false
        } else {
            self.select(vmid)
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Set the provisional status of the given VMs; returns the vmids that changed
    pub fn project_status(&mut self, vmids: &[u32], status: VmStatus) -> Vec<u32> {
        let Some(vms) = self.vms.ready_mut() else {
            return Vec::new();
        };

        let mut changed = Vec::new();
        for vm in vms.iter_mut() {
            if vmids.contains(&vm.vmid) && vm.status != status {
                vm.status = status;
                changed.push(vm.vmid);
            }
        }
        changed
    }
}
