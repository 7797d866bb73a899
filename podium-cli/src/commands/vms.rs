//! Virtual machine commands

use crate::output::{self, OutputFormat};
use crate::portal::Portal;
use crate::VmCommands;
use anyhow::{bail, Result};
use podium_common::{VirtualMachine, VmAction};
use podium_core::{BatchReport, VmInventoryStore, VmResult, View};
use serde::Serialize;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
pub struct VmRow {
    vmid: u32,
    name: String,
    node: String,
    status: String,
}

impl From<&VirtualMachine> for VmRow {
    fn from(vm: &VirtualMachine) -> Self {
        Self {
            vmid: vm.vmid,
            name: vm.name.clone(),
            node: vm.node.clone(),
            status: vm.status.to_string(),
        }
    }
}

pub fn vm_rows(vms: Option<&Vec<VirtualMachine>>) -> Vec<VmRow> {
    vms.map(|vms| vms.iter().map(VmRow::from).collect())
        .unwrap_or_default()
}

#[derive(Tabled, Serialize)]
struct OutcomeRow {
    vmid: u32,
    result: String,
    #[tabled(rename = "status changed")]
    changed: bool,
}

fn outcome_rows(report: &BatchReport) -> Vec<OutcomeRow> {
    report
        .outcomes
        .iter()
        .map(|outcome| OutcomeRow {
            vmid: outcome.vmid,
            result: match &outcome.result {
                VmResult::Succeeded => "ok".to_string(),
                VmResult::Failed(message) => message.clone(),
                VmResult::Missing => "not in inventory".to_string(),
            },
            changed: report.changed.contains(&outcome.vmid),
        })
        .collect()
}

pub async fn handle_vm_command(
    command: VmCommands,
    portal: &Portal,
    format: OutputFormat,
) -> Result<()> {
    portal.authorize(View::Admin)?;

    let mut dashboard = portal.dashboard();
    load_inventory(&mut dashboard.inventory, portal).await?;

    match command {
        VmCommands::List => {
            output::print_output(vm_rows(dashboard.inventory.vms().ready()), format)?;
        }

        VmCommands::Start { vmids } => {
            select(&mut dashboard.inventory, &vmids);
            let spinner = output::spinner(format!("Starting {} VM(s)...", vmids.len()));
            let report = dashboard
                .lifecycle
                .start_selected(&mut dashboard.inventory, &portal.api)
                .await;
            spinner.finish_and_clear();
            print_report(&report?, format)?;
        }

        VmCommands::Stop { vmids } => {
            select(&mut dashboard.inventory, &vmids);
            let spinner = output::spinner(format!("Stopping {} VM(s)...", vmids.len()));
            let report = dashboard
                .lifecycle
                .stop_selected(&mut dashboard.inventory, &portal.api)
                .await;
            spinner.finish_and_clear();
            print_report(&report?, format)?;
        }
    }

    Ok(())
}

async fn load_inventory(inventory: &mut VmInventoryStore, portal: &Portal) -> Result<()> {
    inventory.refresh(&portal.api).await;
    if let Some(err) = inventory.error() {
        bail!("Failed to load virtual machines: {}", err);
    }
    Ok(())
}

fn select(inventory: &mut VmInventoryStore, vmids: &[u32]) {
    for &vmid in vmids {
        if !inventory.select(vmid) {
            output::print_warning(&format!("VM {} is not in the inventory, skipping", vmid));
        }
    }
}

fn print_report(report: &BatchReport, format: OutputFormat) -> Result<()> {
    output::print_output(outcome_rows(report), format)?;

    match report.failure_message() {
        Some(message) => bail!(message),
        None => {
            let done = match report.action {
                VmAction::Start => "started",
                VmAction::Stop => "stopped",
            };
            output::print_success(&format!("{} VM(s) {}", report.outcomes.len(), done));
            Ok(())
        }
    }
}
