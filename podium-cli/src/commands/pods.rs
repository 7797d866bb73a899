//! Pod commands

use crate::output::{self, OutputFormat};
use crate::portal::Portal;
use crate::PodCommands;
use anyhow::{bail, Result};
use dialoguer::Confirm;
use podium_common::Pod;
use podium_core::{DeleteOutcome, DeletePolicy, ResourceCatalogStore, View};
use serde::Serialize;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
pub struct PodRow {
    name: String,
    deployed: String,
    state: String,
}

impl From<&Pod> for PodRow {
    fn from(pod: &Pod) -> Self {
        Self {
            name: pod.name.clone(),
            deployed: output::format_timestamp(&pod.deployed_at),
            state: if pod.pending { "deploying" } else { "ready" }.to_string(),
        }
    }
}

pub fn pod_rows(pods: Option<&Vec<Pod>>) -> Vec<PodRow> {
    pods.map(|pods| pods.iter().map(PodRow::from).collect())
        .unwrap_or_default()
}

pub async fn handle_pod_command(
    command: PodCommands,
    portal: &Portal,
    format: OutputFormat,
) -> Result<()> {
    match command {
        PodCommands::List { all } => {
            let mut catalog = ResourceCatalogStore::new();
            if all {
                portal.authorize(View::Admin)?;
                catalog.refresh_all_pods(&portal.api).await;
                if let Some(err) = catalog.all_pods_error() {
                    bail!("Failed to load cluster pods: {}", err);
                }
                output::print_output(pod_rows(catalog.all_pods().ready()), format)?;
            } else {
                portal.home()?;
                catalog.refresh_user_pods(&portal.api).await;
                if let Some(err) = catalog.user_pods_error() {
                    bail!("Failed to load pods: {}", err);
                }
                output::print_output(pod_rows(catalog.user_pods().ready()), format)?;
            }
        }

        PodCommands::Delete { name, yes } => {
            let view = portal.home()?;

            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("Are you sure you want to delete pod {}?", name))
                    .default(false)
                    .interact()?;
            if !confirmed {
                output::print_info("Deletion cancelled");
                return Ok(());
            }

            let mut dashboard = portal.dashboard();
            dashboard.mount(&portal.api, view).await;

            let spinner = output::spinner(format!("Deleting pod '{}'...", name));
            let outcome = dashboard
                .orchestrator
                .delete(&mut dashboard.catalog, &portal.api, &name)
                .await;
            spinner.finish_and_clear();

            match outcome {
                Ok(DeleteOutcome::Deleted(name)) => {
                    output::print_success(&format!("Pod '{}' deleted", name));
                }
                Ok(DeleteOutcome::AlreadyPending) => {
                    output::print_warning(&format!(
                        "Pod '{}' already has an action in progress",
                        name
                    ));
                }
                Err(e) => {
                    if dashboard.orchestrator.delete_policy() == DeletePolicy::KeepRemoved {
                        output::print_info("The pod stays hidden until the next refresh");
                    }
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
