//! Template catalog commands

use crate::output::{self, OutputFormat};
use crate::portal::Portal;
use crate::TemplateCommands;
use anyhow::{bail, Result};
use podium_common::Template;
use podium_core::{DeployOutcome, ResourceCatalogStore};
use serde::Serialize;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
pub struct TemplateRow {
    name: String,
}

impl From<&Template> for TemplateRow {
    fn from(template: &Template) -> Self {
        Self {
            name: template.name.clone(),
        }
    }
}

pub async fn handle_template_command(
    command: TemplateCommands,
    portal: &Portal,
    format: OutputFormat,
) -> Result<()> {
    let view = portal.home()?;

    match command {
        TemplateCommands::List => {
            let mut catalog = ResourceCatalogStore::new();
            catalog.refresh_templates(&portal.api).await;

            if let Some(err) = catalog.template_error() {
                bail!("Failed to load templates: {}", err);
            }

            let rows: Vec<TemplateRow> = catalog
                .templates()
                .ready()
                .map(|templates| templates.iter().map(TemplateRow::from).collect())
                .unwrap_or_default();
            output::print_output(rows, format)?;
        }

        TemplateCommands::Deploy { name } => {
            let mut dashboard = portal.dashboard();
            dashboard.mount(&portal.api, view).await;
            if let Some(err) = dashboard.catalog.template_error() {
                bail!("Failed to load templates: {}", err);
            }

            let spinner = output::spinner(format!("Deploying template '{}'...", name));
            let outcome = dashboard
                .orchestrator
                .deploy(&mut dashboard.catalog, &portal.api, &name)
                .await;
            spinner.finish_and_clear();

            match outcome? {
                DeployOutcome::Deployed(pod) => {
                    output::print_success(&format!(
                        "Pod '{}' deployed from template '{}'",
                        pod.name, name
                    ));
                }
                DeployOutcome::AlreadyPending => {
                    output::print_warning(&format!(
                        "A deployment of '{}' is already in progress",
                        name
                    ));
                }
            }
        }
    }

    Ok(())
}
