//! Error types for token validation.
//!
//! Startup failures ([`CertificateLoadError`], [`ProtocolError`]) are fatal
//! and carry operator-facing detail. Per-request failures ([`TokenParseError`],
//! [`SignatureError`]) end up inside a pipeline
//! [`Rejection`](crate::pipeline::Rejection) and are only ever logged.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for startup and wiring operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that prevent the validator from being constructed.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A configured certificate could not be loaded.
    #[error(transparent)]
    CertificateLoad(#[from] CertificateLoadError),

    /// No trusted certificates are configured.
    #[error("signing certificate wallet is empty")]
    EmptyWallet,

    /// [`initialize`](crate::initialize) has not been called.
    #[error("XML security is not initialized")]
    NotInitialized,

    /// The configuration is incomplete or invalid.
    #[error(transparent)]
    Config(#[from] wsfed_core::Error),
}

/// Failure to turn a certificate file into a trusted key.
#[derive(Debug, Error)]
pub enum CertificateLoadError {
    /// The file does not exist.
    #[error("certificate file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("failed to read certificate file {}: {source}", .path.display())]
    Io {
        /// Certificate file.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The file does not hold one well-formed X.509 certificate.
    #[error("malformed certificate in {}: {reason}", .path.display())]
    Malformed {
        /// Certificate file.
        path: PathBuf,
        /// Parser diagnostic.
        reason: String,
    },

    /// The certificate key is not an RSA key.
    #[error("unsupported key algorithm in {}: {algorithm}", .path.display())]
    UnsupportedKeyAlgorithm {
        /// Certificate file.
        path: PathBuf,
        /// Algorithm that was found.
        algorithm: String,
    },
}

impl CertificateLoadError {
    /// Returns the file the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(path)
            | Self::Io { path, .. }
            | Self::Malformed { path, .. }
            | Self::UnsupportedKeyAlgorithm { path, .. } => path,
        }
    }
}

/// Failure to extract an assertion from a token response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenParseError {
    /// The payload is not well-formed or is structurally unacceptable.
    #[error("malformed token response: {0}")]
    Malformed(String),

    /// The payload is not valid UTF-8 or holds invalid references.
    #[error("token response encoding error: {0}")]
    Encoding(String),

    /// The envelope has no `RequestedSecurityToken`.
    #[error("token response has no RequestedSecurityToken")]
    MissingRequestedSecurityToken,

    /// The requested security token holds no SAML assertion.
    #[error("requested security token holds no assertion")]
    MissingAssertion,

    /// The assertion lacks a mandatory field or has an unreadable one.
    #[error("invalid assertion: {0}")]
    InvalidAssertion(String),
}

/// Why a signature could not be accepted.
///
/// The verifier only reports pass or fail; these reasons go to the log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The assertion carries no `ds:Signature` child.
    #[error("assertion is not signed")]
    Missing,

    /// The signature block is structurally unusable.
    #[error("malformed signature: {0}")]
    Malformed(String),

    /// An algorithm or transform is not supported.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A SHA-1 based algorithm was used without being allowed.
    #[error("legacy algorithm rejected: {0}")]
    LegacyAlgorithm(String),

    /// The reference does not point at the enclosing assertion.
    #[error("reference `{0}` does not identify the assertion")]
    ReferenceMismatch(String),

    /// The signed content was altered.
    #[error("digest mismatch")]
    DigestMismatch,

    /// No trusted key produced a valid signature.
    #[error("no trusted certificate validates the signature")]
    NoMatchingKey,

    /// The wallet has no keys.
    #[error("signing certificate wallet is empty")]
    EmptyWallet,

    /// [`initialize`](crate::initialize) has not been called.
    #[error("XML security is not initialized")]
    NotInitialized,
}
