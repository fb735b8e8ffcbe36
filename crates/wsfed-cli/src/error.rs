//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid federation configuration.
    #[error("configuration error: {0}")]
    Federation(#[from] wsfed_core::Error),

    /// The validator could not be set up.
    #[error("{0}")]
    Protocol(#[from] wsfed_protocol::ProtocolError),

    /// The token could not be parsed.
    #[error("token error: {0}")]
    Token(#[from] wsfed_protocol::TokenParseError),

    /// The token was rejected.
    #[error("token rejected at {stage} stage: {0}", stage = .0.stage())]
    Rejected(#[from] wsfed_protocol::Rejection),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
