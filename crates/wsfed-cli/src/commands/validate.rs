//! Full token validation.

use chrono::{DateTime, Utc};

use wsfed_core::FederationConfig;
use wsfed_protocol::{Credential, FederationValidator, SecurityPolicy, ValidationContext};

use super::read_token;
use crate::config::OutputFormat;
use crate::output::{output_single, success};
use crate::{CliError, CliResult};

/// Runs the validate command.
///
/// A rejected token is returned as [`CliError::Rejected`].
pub fn run_validate(token: &str, config: &FederationConfig, format: OutputFormat) -> CliResult<()> {
    let credential = validate_token(token, config, Utc::now())?;
    if format == OutputFormat::Text {
        success("Token accepted");
    }
    output_single(&credential, format)
}

/// Validates the token read from `token` as if received at `retrieved_on`.
pub fn validate_token(
    token: &str,
    config: &FederationConfig,
    retrieved_on: DateTime<Utc>,
) -> CliResult<Credential> {
    wsfed_protocol::initialize_with(SecurityPolicy::default().with_allow_sha1(config.allow_sha1));

    let validator = FederationValidator::new(ValidationContext::from_config(config)?)?;

    let raw = read_token(token)?;
    let raw = String::from_utf8(raw)
        .map_err(|_| CliError::InvalidArgument(format!("{token} is not UTF-8 text")))?;

    Ok(validator.validate_at(raw.trim_start_matches('\u{feff}'), retrieved_on)?)
}
