//! Podium client core
//!
//! Session gating and resource lifecycle orchestration for the podium
//! virtualization portal:
//! - `session`: session/role resolution and view routing
//! - `catalog`, `inventory`: stores refreshed from the control plane
//! - `orchestrator`: optimistic pod deploy/delete
//! - `lifecycle`: batched VM start/stop
//! - `api`: the remote API boundary

pub mod api;
pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod inventory;
pub mod lifecycle;
pub mod logging;
pub mod orchestrator;
pub mod session;

pub use api::{ApiResult, HttpApiClient, RemoteApi};
pub use catalog::{PendingOp, ResourceCatalogStore};
pub use dashboard::{Dashboard, ScreenStatus};
pub use error::{classify_failure, ActionError, ApiError, LoginError};
pub use fetch::FetchState;
pub use inventory::VmInventoryStore;
pub use lifecycle::{BatchPolicy, BatchReport, VmLifecycleController, VmOutcome, VmResult};
pub use orchestrator::{
    DeleteOutcome, DeletePolicy, DeployOutcome, DeploymentOrchestrator,
};
pub use session::{route, RouteDecision, Session, SessionResolver, SessionState, View};
