//! Effective configuration display.

use wsfed_core::FederationConfig;

use crate::config::OutputFormat;
use crate::output::{info, warning};
use crate::CliResult;

/// Runs the config command.
pub fn run_config(config: &FederationConfig, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Text => {
            info("Effective configuration (file and WSFED_* overrides):");
            println!();
            print!("{}", toml::to_string_pretty(config)?);
            if let Err(e) = config.validate() {
                println!();
                warning(&e.to_string());
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
    }
    Ok(())
}
