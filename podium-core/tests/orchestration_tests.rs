//! Pod deploy and delete through the orchestrator

mod common;

use common::{pod_names, server_error, MockApi};
use podium_common::CloneResponse;
use podium_core::{
    ActionError, ApiError, DeleteOutcome, DeletePolicy, DeployOutcome, DeploymentOrchestrator,
    PendingOp, ResourceCatalogStore,
};

async fn loaded_catalog(api: &MockApi) -> ResourceCatalogStore {
    let mut catalog = ResourceCatalogStore::new();
    catalog.refresh_all(api, true).await;
    catalog
}

fn clone_ok(pod_name: &str) -> Result<CloneResponse, ApiError> {
    Ok(CloneResponse {
        pod_name: pod_name.to_string(),
    })
}

#[tokio::test]
async fn test_deploy_replaces_placeholder_with_server_pod() {
    let api = MockApi::new()
        .with_templates(&["ubuntu-22"])
        .with_clone(clone_ok("ubuntu-22-7f3"));
    let mut catalog = ResourceCatalogStore::new();
    catalog.refresh_all(&api, false).await;
    let orchestrator = DeploymentOrchestrator::default();

    let outcome = orchestrator
        .deploy(&mut catalog, &api, "ubuntu-22")
        .await
        .unwrap();

    match outcome {
        DeployOutcome::Deployed(pod) => {
            assert_eq!(pod.name, "ubuntu-22-7f3");
            assert!(!pod.pending);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(
        pod_names(catalog.user_pods().ready()),
        vec![("ubuntu-22-7f3".to_string(), false)]
    );
    assert!(catalog.pending_op("ubuntu-22").is_none());
    assert_eq!(api.count_calls("POST /api/proxmox/templates/clone ubuntu-22"), 1);
}

#[tokio::test]
async fn test_deploy_in_flight_adds_one_placeholder_per_collection() {
    let api = MockApi::new()
        .with_templates(&["ubuntu-22"])
        .with_user_pods(&["alpha"])
        .with_all_pods(&["alpha", "beta"]);
    let mut catalog = loaded_catalog(&api).await;
    let orchestrator = DeploymentOrchestrator::default();

    let ticket = orchestrator
        .begin_deploy(&mut catalog, "ubuntu-22")
        .unwrap()
        .unwrap();
    assert_eq!(ticket.template_name(), "ubuntu-22");

    for pods in [catalog.user_pods().ready(), catalog.all_pods().ready()] {
        let placeholders: Vec<_> = pods.unwrap().iter().filter(|p| p.pending).collect();
        assert_eq!(placeholders.len(), 1);
        assert_eq!(placeholders[0].name, "ubuntu-22");
    }
    assert_eq!(catalog.pending_op("ubuntu-22"), Some(PendingOp::Deploy));
    assert!(catalog.user_pods_within_cluster());
}

#[tokio::test]
async fn test_deploy_while_pending_sends_nothing() {
    let api = MockApi::new()
        .with_templates(&["ubuntu-22"])
        .with_clone(clone_ok("ubuntu-22-7f3"));
    let mut catalog = loaded_catalog(&api).await;
    let orchestrator = DeploymentOrchestrator::default();

    let _ticket = orchestrator.begin_deploy(&mut catalog, "ubuntu-22").unwrap();
    let outcome = orchestrator
        .deploy(&mut catalog, &api, "ubuntu-22")
        .await
        .unwrap();

    assert_eq!(outcome, DeployOutcome::AlreadyPending);
    assert_eq!(api.count_calls("POST /api/proxmox/templates/clone"), 0);
}

#[tokio::test]
async fn test_failed_deploy_restores_both_collections() {
    let api = MockApi::new()
        .with_templates(&["ubuntu-22"])
        .with_user_pods(&["alpha"])
        .with_all_pods(&["alpha", "beta"])
        .with_clone(Err(server_error("no capacity")));
    let mut catalog = loaded_catalog(&api).await;
    let user_before = catalog.user_pods().clone();
    let all_before = catalog.all_pods().clone();
    let orchestrator = DeploymentOrchestrator::default();

    let err = orchestrator
        .deploy(&mut catalog, &api, "ubuntu-22")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to deploy template: no capacity");
    assert_eq!(catalog.user_pods(), &user_before);
    assert_eq!(catalog.all_pods(), &all_before);
    assert!(catalog.pending_op("ubuntu-22").is_none());
}

#[tokio::test]
async fn test_deploy_of_unknown_template_sends_nothing() {
    let api = MockApi::new().with_templates(&["ubuntu-22"]);
    let mut catalog = loaded_catalog(&api).await;

    let err = DeploymentOrchestrator::default()
        .deploy(&mut catalog, &api, "windows-11")
        .await
        .unwrap_err();

    assert_eq!(err, ActionError::UnknownTemplate("windows-11".to_string()));
    assert_eq!(api.count_calls("POST /api/proxmox/templates/clone"), 0);
}

#[tokio::test]
async fn test_deploy_uses_last_catalog_after_failed_refresh() {
    let api = MockApi::new()
        .with_templates(&["ubuntu-22"])
        .with_clone(clone_ok("ubuntu-22-7f3"));
    let mut catalog = loaded_catalog(&api).await;

    let flaky = MockApi {
        templates: Err(server_error("proxmox unreachable")),
        ..MockApi::new()
    };
    catalog.refresh_templates(&flaky).await;
    assert_eq!(catalog.template_error(), Some("proxmox unreachable"));

    let outcome = DeploymentOrchestrator::default()
        .deploy(&mut catalog, &api, "ubuntu-22")
        .await
        .unwrap();
    assert!(matches!(outcome, DeployOutcome::Deployed(ref pod) if pod.name == "ubuntu-22-7f3"));
    assert_eq!(api.count_calls("POST /api/proxmox/templates/clone ubuntu-22"), 1);
}

#[tokio::test]
async fn test_deploy_without_any_loaded_catalog_sends_nothing() {
    let api = MockApi {
        templates: Err(server_error("proxmox unreachable")),
        ..MockApi::new()
    }
    .with_clone(clone_ok("ubuntu-22-7f3"));
    let mut catalog = loaded_catalog(&api).await;

    let err = DeploymentOrchestrator::default()
        .deploy(&mut catalog, &api, "ubuntu-22")
        .await
        .unwrap_err();

    assert_eq!(err, ActionError::CatalogUnavailable("ubuntu-22".to_string()));
    assert_eq!(api.count_calls("POST /api/proxmox/templates/clone"), 0);
}

#[tokio::test]
async fn test_placeholder_survives_refresh_before_clone_settles() {
    let api = MockApi::new()
        .with_templates(&["ubuntu-22"])
        .with_user_pods(&["alpha"]);
    let mut catalog = loaded_catalog(&api).await;
    let orchestrator = DeploymentOrchestrator::default();

    let ticket = orchestrator
        .begin_deploy(&mut catalog, "ubuntu-22")
        .unwrap()
        .unwrap();
    catalog.refresh_user_pods(&api).await;

    assert_eq!(
        pod_names(catalog.user_pods().ready()),
        vec![("alpha".to_string(), false), ("ubuntu-22".to_string(), true)]
    );

    orchestrator
        .finish_deploy(&mut catalog, ticket, clone_ok("ubuntu-22-7f3"))
        .unwrap();
    assert_eq!(
        pod_names(catalog.user_pods().ready()),
        vec![("alpha".to_string(), false), ("ubuntu-22-7f3".to_string(), false)]
    );
}

#[tokio::test]
async fn test_delete_removes_pod_before_the_call_settles() {
    let api = MockApi::new()
        .with_user_pods(&["alpha"])
        .with_all_pods(&["alpha", "beta"]);
    let mut catalog = loaded_catalog(&api).await;
    let orchestrator = DeploymentOrchestrator::default();

    let ticket = orchestrator
        .begin_delete(&mut catalog, "alpha")
        .unwrap()
        .unwrap();

    assert_eq!(ticket.pod_name(), "alpha");
    assert!(!catalog.has_pod("alpha"));
    assert!(pod_names(catalog.user_pods().ready()).is_empty());
    assert_eq!(
        pod_names(catalog.all_pods().ready()),
        vec![("beta".to_string(), false)]
    );
    assert_eq!(catalog.pending_op("alpha"), Some(PendingOp::Delete));
}

#[tokio::test]
async fn test_successful_delete() {
    let api = MockApi::new()
        .with_user_pods(&["alpha"])
        .with_all_pods(&["alpha", "beta"]);
    let mut catalog = loaded_catalog(&api).await;

    let outcome = DeploymentOrchestrator::default()
        .delete(&mut catalog, &api, "alpha")
        .await
        .unwrap();

    assert_eq!(outcome, DeleteOutcome::Deleted("alpha".to_string()));
    assert!(!catalog.has_pod("alpha"));
    assert!(catalog.pending_op("alpha").is_none());
    assert_eq!(api.count_calls("POST /api/proxmox/pods/delete alpha"), 1);
}

#[tokio::test]
async fn test_failed_delete_follows_policy() {
    for (policy, restored) in [
        (DeletePolicy::Rollback, true),
        (DeletePolicy::KeepRemoved, false),
    ] {
        let api = MockApi {
            delete: Err(server_error("pod is locked")),
            ..MockApi::new()
                .with_user_pods(&["alpha", "gamma"])
                .with_all_pods(&["alpha", "beta", "gamma"])
        };
        let mut catalog = loaded_catalog(&api).await;
        let orchestrator = DeploymentOrchestrator::new(policy);

        let err = orchestrator
            .delete(&mut catalog, &api, "alpha")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to delete pod: pod is locked");
        assert_eq!(catalog.has_pod("alpha"), restored, "policy {:?}", policy);
        if restored {
            // Back at its original position
            assert_eq!(
                pod_names(catalog.user_pods().ready())[0],
                ("alpha".to_string(), false)
            );
        }
        assert!(catalog.pending_op("alpha").is_none());
    }
}

#[tokio::test]
async fn test_delete_while_pending_sends_nothing() {
    let api = MockApi::new().with_user_pods(&["alpha"]);
    let mut catalog = loaded_catalog(&api).await;
    let orchestrator = DeploymentOrchestrator::default();

    let _ticket = orchestrator.begin_delete(&mut catalog, "alpha").unwrap();
    let outcome = orchestrator
        .delete(&mut catalog, &api, "alpha")
        .await
        .unwrap();

    assert_eq!(outcome, DeleteOutcome::AlreadyPending);
    assert_eq!(api.count_calls("POST /api/proxmox/pods/delete"), 0);
}
