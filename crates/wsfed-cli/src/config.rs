//! CLI configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use wsfed_core::FederationConfig;

use crate::{CliError, CliResult};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

/// Gets the default configuration file path.
pub fn default_config_path() -> CliResult<PathBuf> {
    let home = dirs_next::home_dir()
        .ok_or_else(|| CliError::Config("could not determine home directory".to_string()))?;
    Ok(home.join(".wsfed").join("federation.toml"))
}

/// Loads the federation configuration.
///
/// Reads `.env` if present, then the TOML file, then applies `WSFED_*`
/// environment overrides.
pub fn load(path: Option<&Path>) -> CliResult<FederationConfig> {
    let _ = dotenvy::dotenv();

    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if !path.exists() {
        return Err(CliError::Config(format!(
            "no configuration file at {}",
            path.display()
        )));
    }

    let mut config = FederationConfig::from_file(&path)?;
    config.apply_env()?;
    Ok(config)
}
