//! Authentication handlers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::credentials::Credentials;
use crate::error::{AuthError, AuthResult};
use crate::principal::{populate_attributes, Principal, WsFederationPrincipalResolver};

/// Outcome of a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Authentication {
    /// Authenticated principal with its attributes.
    pub principal: Principal,
    /// When the handler accepted the credentials.
    pub authenticated_at: DateTime<Utc>,
    /// Handler that accepted the credentials.
    pub handler: &'static str,
}

/// A pluggable authentication step of the host.
pub trait AuthenticationHandler: Send + Sync {
    /// Returns the handler ID.
    fn id(&self) -> &'static str;

    /// Checks whether this handler understands `credentials`.
    fn supports(&self, credentials: &Credentials) -> bool;

    /// Authenticates the credentials.
    ///
    /// # Errors
    ///
    /// Returns why the credentials were not accepted.
    fn authenticate(&self, credentials: &Credentials) -> AuthResult<Authentication>;
}

/// Accepts validated WS-Federation credentials.
///
/// The token has already been verified by the pipeline, so authenticating
/// means resolving a principal from it.
#[derive(Debug, Clone)]
pub struct WsFederationAuthenticationHandler {
    resolver: WsFederationPrincipalResolver,
}

impl WsFederationAuthenticationHandler {
    /// Handler ID.
    pub const ID: &'static str = "ws-federation";

    /// Creates a handler using `resolver`.
    #[must_use]
    pub const fn new(resolver: WsFederationPrincipalResolver) -> Self {
        Self { resolver }
    }
}

impl AuthenticationHandler for WsFederationAuthenticationHandler {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn supports(&self, credentials: &Credentials) -> bool {
        self.resolver.supports(credentials)
    }

    fn authenticate(&self, credentials: &Credentials) -> AuthResult<Authentication> {
        if !self.supports(credentials) {
            return Err(AuthError::UnsupportedCredentials {
                kind: credentials.kind(),
            });
        }

        let principal_id = self.resolver.resolve(credentials).inspect_err(|e| {
            tracing::warn!(error = %e, "federation principal could not be resolved");
        })?;
        let principal = populate_attributes(Principal::new(principal_id), credentials);

        Ok(Authentication {
            principal,
            authenticated_at: Utc::now(),
            handler: Self::ID,
        })
    }
}
