//! Authentication error types.

use std::fmt;

use wsfed_protocol::Rejection;

/// Authentication operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The handler does not accept this kind of credentials.
    UnsupportedCredentials {
        /// Kind of credentials offered.
        kind: &'static str,
    },
    /// The credential lacks the configured identity attribute.
    MissingIdentityAttribute {
        /// Configured attribute name.
        attribute: String,
    },
    /// The identity attribute carries several values.
    AmbiguousIdentity {
        /// Configured attribute name.
        attribute: String,
        /// Number of values found.
        count: usize,
    },
    /// The token itself was rejected.
    TokenRejected(Rejection),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedCredentials { kind } => write!(f, "unsupported credentials: {kind}"),
            Self::MissingIdentityAttribute { attribute } => {
                write!(f, "identity attribute `{attribute}` is missing")
            }
            Self::AmbiguousIdentity { attribute, count } => {
                write!(f, "identity attribute `{attribute}` has {count} values")
            }
            Self::TokenRejected(rejection) => write!(f, "{rejection}"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TokenRejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

impl From<Rejection> for AuthError {
    fn from(rejection: Rejection) -> Self {
        Self::TokenRejected(rejection)
    }
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
