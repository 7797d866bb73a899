//! Screen-level aggregate of the catalog and inventory stores
//!
//! The stores are owned here and lent out to the controllers that mutate
//! them, so every mutation site takes an explicit `&mut`.

use crate::api::RemoteApi;
use crate::catalog::ResourceCatalogStore;
use crate::inventory::VmInventoryStore;
use crate::lifecycle::VmLifecycleController;
use crate::orchestrator::DeploymentOrchestrator;
use crate::session::View;

/// Overall state of a mounted screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenStatus {
    Loading,
    Failed(String),
    Ready,
}

#[derive(Debug, Default)]
pub struct Dashboard {
    pub catalog: ResourceCatalogStore,
    pub inventory: VmInventoryStore,
    pub orchestrator: DeploymentOrchestrator,
    pub lifecycle: VmLifecycleController,
}

impl Dashboard {
    pub fn new(orchestrator: DeploymentOrchestrator, lifecycle: VmLifecycleController) -> Self {
        Self {
            catalog: ResourceCatalogStore::new(),
            inventory: VmInventoryStore::new(),
            orchestrator,
            lifecycle,
        }
    }

    /// Populate the stores for a view. The admin view adds the cluster-wide
    /// pods and the VM inventory; all fetches run concurrently and settle in any order.
    pub async fn mount<A: RemoteApi + ?Sized>(&mut self, api: &A, view: View) {
        let admin = view == View::Admin;
        let Self {
            catalog, inventory, ..
        } = self;
        let vms = async {
            if admin {
                inventory.refresh(api).await;
            }
        };
        tokio::join!(catalog.refresh_all(api, admin), vms);
    }

    /// Loading while anything is in flight; otherwise the first error in
    /// the order templates, VMs, cluster pods, user pods
    pub fn screen(&self) -> ScreenStatus {
        if self.catalog.is_loading() || self.inventory.is_loading() {
            return ScreenStatus::Loading;
        }

        let first_error = self
            .catalog
            .template_error()
            .or_else(|| self.inventory.error())
            .or_else(|| self.catalog.all_pods_error())
            .or_else(|| self.catalog.user_pods_error());

        match first_error {
            Some(message) => ScreenStatus::Failed(message.to_string()),
            None => ScreenStatus::Ready,
        }
    }
}
