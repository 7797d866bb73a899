//! Podium CLI
//!
//! Command-line client for the podium virtualization portal

mod commands;
mod config;
mod output;
mod portal;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use output::OutputFormat;
use podium_core::View;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Portal address (defaults to the config file, then http://localhost:8080)
    #[arg(short, long, env = "PODIUM_SERVER")]
    server: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Account to sign in with
    #[arg(short, long, env = "PODIUM_USERNAME")]
    username: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Portal(PortalCommands),
    /// Manage the CLI configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Commands that sign in to the portal
#[derive(Subcommand)]
enum PortalCommands {
    /// Show the signed-in account, its role and where each view routes
    Whoami,
    /// Load a whole screen and show everything on it
    Dashboard {
        /// View to load (defaults to the account's home view)
        #[arg(long, value_enum)]
        view: Option<ViewArg>,
    },
    /// Browse and deploy templates
    Templates {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Manage deployed pods
    Pods {
        #[command(subcommand)]
        command: PodCommands,
    },
    /// Manage cluster virtual machines (admin)
    Vms {
        #[command(subcommand)]
        command: VmCommands,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    User,
    Admin,
}

impl From<ViewArg> for View {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::User => View::User,
            ViewArg::Admin => View::Admin,
        }
    }
}

#[derive(Subcommand)]
enum TemplateCommands {
    /// List available templates
    List,
    /// Deploy a pod from a template
    Deploy {
        /// Template name
        name: String,
    },
}

#[derive(Subcommand)]
enum PodCommands {
    /// List your pods
    List {
        /// List every pod in the cluster (admin)
        #[arg(short, long)]
        all: bool,
    },
    /// Delete a pod
    Delete {
        /// Pod name
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum VmCommands {
    /// List virtual machines
    List,
    /// Start one or more VMs
    Start {
        #[arg(required = true)]
        vmids: Vec<u32>,
    },
    /// Stop one or more VMs
    Stop {
        #[arg(required = true)]
        vmids: Vec<u32>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load()?;
    let _log_guard = config.logging.init().map_err(|e| anyhow!(e))?;

    let format = cli.output.unwrap_or(config.output);

    match cli.command {
        Commands::Completions { shell } => generate_completions(shell),
        Commands::Config { command } => {
            commands::config::handle_config_command(command, &config, format)?
        }
        Commands::Portal(command) => {
            let server = cli.server.unwrap_or_else(|| config.server.clone());
            let portal = portal::Portal::connect(&config, &server, cli.username).await?;

            let result = run_portal_command(command, &portal, format).await;
            portal.close().await;
            result?
        }
    }

    Ok(())
}

async fn run_portal_command(
    command: PortalCommands,
    portal: &portal::Portal,
    format: OutputFormat,
) -> Result<()> {
    match command {
        PortalCommands::Whoami => commands::session::handle_whoami(portal, format),
        PortalCommands::Dashboard { view } => {
            commands::dashboard::handle_dashboard_command(view.map(View::from), portal, format)
                .await
        }
        PortalCommands::Templates { command } => {
            commands::templates::handle_template_command(command, portal, format).await
        }
        PortalCommands::Pods { command } => {
            commands::pods::handle_pod_command(command, portal, format).await
        }
        PortalCommands::Vms { command } => {
            commands::vms::handle_vm_command(command, portal, format).await
        }
    }
}

/// Generate shell completions
fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut io::stdout());
}
