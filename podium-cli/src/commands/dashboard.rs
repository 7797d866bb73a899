//! Whole-screen view of templates, pods and virtual machines

use super::pods::pod_rows;
use super::templates::TemplateRow;
use super::vms::vm_rows;
use crate::output::{self, OutputFormat};
use crate::portal::Portal;
use anyhow::{bail, Result};
use podium_common::{Pod, Template, VirtualMachine};
use podium_core::{Dashboard, ScreenStatus, View};
use serde::Serialize;

#[derive(Serialize)]
struct Snapshot<'a> {
    view: String,
    templates: Option<&'a Vec<Template>>,
    pods: Option<&'a Vec<Pod>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    all_pods: Option<&'a Vec<Pod>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    virtual_machines: Option<&'a Vec<VirtualMachine>>,
}

pub async fn handle_dashboard_command(
    requested: Option<View>,
    portal: &Portal,
    format: OutputFormat,
) -> Result<()> {
    let view = match requested {
        Some(view) => portal.authorize(view)?,
        None => portal.home()?,
    };

    let mut dashboard = portal.dashboard();
    let spinner = output::spinner(format!("Loading {} dashboard...", view));
    dashboard.mount(&portal.api, view).await;
    spinner.finish_and_clear();

    if format == OutputFormat::Table {
        print_tables(&dashboard, portal, view);
    } else {
        let snapshot = Snapshot {
            view: view.to_string(),
            templates: dashboard.catalog.templates().ready(),
            pods: dashboard.catalog.user_pods().ready(),
            all_pods: dashboard.catalog.all_pods().ready(),
            virtual_machines: dashboard.inventory.vms().ready(),
        };
        output::print_single(&snapshot, format)?;
    }

    match dashboard.screen() {
        ScreenStatus::Ready => Ok(()),
        ScreenStatus::Failed(message) => bail!(message),
        ScreenStatus::Loading => bail!("Dashboard did not finish loading"),
    }
}

fn print_tables(dashboard: &Dashboard, portal: &Portal, view: View) {
    let name = portal
        .session
        .display_name
        .as_deref()
        .unwrap_or(&portal.username);
    output::print_info(&format!("Welcome, {}", name));

    if let Some(templates) = dashboard.catalog.templates().ready() {
        output::print_heading("Templates");
        output::print_table(templates.iter().map(TemplateRow::from).collect());
    }

    if dashboard.catalog.user_pods().is_ready() {
        output::print_heading("Your pods");
        output::print_table(pod_rows(dashboard.catalog.user_pods().ready()));
    }

    if view != View::Admin {
        return;
    }

    if dashboard.catalog.all_pods().is_ready() {
        output::print_heading("All pods");
        output::print_table(pod_rows(dashboard.catalog.all_pods().ready()));
        if !dashboard.catalog.user_pods_within_cluster() {
            output::print_warning("Some of your pods are missing from the cluster-wide list");
        }
    }

    if dashboard.inventory.vms().is_ready() {
        output::print_heading("Virtual machines");
        output::print_table(vm_rows(dashboard.inventory.vms().ready()));
    }
}
