//! Config file commands

use crate::config::Config;
use crate::output::{self, OutputFormat};
use crate::ConfigCommands;
use anyhow::{bail, Result};

pub fn handle_config_command(
    command: ConfigCommands,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            match format {
                OutputFormat::Table => {
                    output::print_info(&format!("Config file: {}", Config::config_path()?.display()));
                    print!("{}", config.to_toml()?);
                }
                _ => output::print_single(config, format)?,
            }
        }

        ConfigCommands::Init { force } => {
            let path = Config::config_path()?;
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            let path = Config::default().save()?;
            output::print_success(&format!("Wrote default configuration to {}", path.display()));
        }
    }

    Ok(())
}
