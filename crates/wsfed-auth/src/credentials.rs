//! Credentials offered to the host's authentication handlers.

use std::fmt;

use wsfed_protocol::Credential;

/// Something a user presented to prove who they are.
///
/// Handlers inspect the variant to decide whether they apply.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A validated WS-Federation credential.
    WsFederation(Credential),
    /// A local username and password, handled elsewhere.
    UsernamePassword {
        /// Login name.
        username: String,
        /// Plaintext password.
        password: String,
    },
}

impl Credentials {
    /// Short name of the variant, for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::WsFederation(_) => "ws-federation",
            Self::UsernamePassword { .. } => "username-password",
        }
    }

    /// Returns the federation credential, if this is one.
    #[must_use]
    pub const fn as_ws_federation(&self) -> Option<&Credential> {
        match self {
            Self::WsFederation(credential) => Some(credential),
            Self::UsernamePassword { .. } => None,
        }
    }
}

impl From<Credential> for Credentials {
    fn from(credential: Credential) -> Self {
        Self::WsFederation(credential)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WsFederation(credential) => f
                .debug_tuple("WsFederation")
                .field(&credential.id())
                .finish(),
            Self::UsernamePassword { username, .. } => f
                .debug_struct("UsernamePassword")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}
