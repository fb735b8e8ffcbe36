//! Error handling for the federation bridge.
//!
//! Configuration problems are fatal at startup and are reported with enough
//! detail for an operator to fix them. Nothing in this type is ever shown to
//! an end user.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the bridge error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Base error type for configuration handling.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A value is present but not acceptable.
    #[error("invalid configuration value for `{key}`: {reason}")]
    InvalidValue {
        /// Configuration key.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A required value is missing or blank.
    #[error("missing required configuration value `{0}`")]
    Missing(&'static str),
}

impl Error {
    /// Returns the configuration key involved, if the error concerns one.
    #[must_use]
    pub const fn key(&self) -> Option<&'static str> {
        match self {
            Self::InvalidValue { key, .. } | Self::Missing(key) => Some(key),
            Self::Io { .. } | Self::Config(_) => None,
        }
    }
}
