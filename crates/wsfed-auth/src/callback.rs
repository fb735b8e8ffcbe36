//! The identity provider's POST back to the relying party.

use std::collections::HashMap;

use wsfed_core::FederationConfig;
use wsfed_protocol::{FederationValidator, ProtocolResult, ValidationContext};

use crate::credentials::Credentials;
use crate::handler::{Authentication, AuthenticationHandler, WsFederationAuthenticationHandler};
use crate::principal::WsFederationPrincipalResolver;

/// Form parameter carrying the token response.
pub const WRESULT: &str = "wresult";

/// Generic text shown to users after any failure.
pub const LOGIN_FAILED: &str = wsfed_protocol::pipeline::USER_MESSAGE;

/// What the web flow should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// No token was posted; start a new round trip to the identity provider.
    NoToken,
    /// The user is authenticated.
    Authenticated(Authentication),
    /// The token or principal was rejected. Details are only logged.
    Rejected {
        /// Text safe to show to the user.
        message: &'static str,
    },
}

impl CallbackOutcome {
    const fn rejected() -> Self {
        Self::Rejected {
            message: LOGIN_FAILED,
        }
    }

    /// Returns true for [`CallbackOutcome::Authenticated`].
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Validates posted tokens and authenticates their principal.
#[derive(Debug, Clone)]
pub struct FederationCallback {
    validator: FederationValidator,
    handler: WsFederationAuthenticationHandler,
}

impl FederationCallback {
    /// Wires a callback from a validator.
    #[must_use]
    pub fn new(validator: FederationValidator) -> Self {
        let resolver =
            WsFederationPrincipalResolver::new(validator.context().identity_attribute());
        Self {
            validator,
            handler: WsFederationAuthenticationHandler::new(resolver),
        }
    }

    /// Loads the context described by `config`.
    ///
    /// # Errors
    ///
    /// Fails on bad configuration, on unloadable certificates and before
    /// [`wsfed_protocol::initialize`] has run.
    pub fn from_config(config: &FederationConfig) -> ProtocolResult<Self> {
        let context = ValidationContext::from_config(config)?;
        Ok(Self::new(FederationValidator::new(context)?))
    }

    /// Handles the callback request parameters.
    #[must_use]
    pub fn handle(&self, params: &HashMap<String, String>) -> CallbackOutcome {
        self.handle_wresult(params.get(WRESULT).map(String::as_str))
    }

    /// Handles the raw `wresult` value, if one was posted.
    #[must_use]
    pub fn handle_wresult(&self, wresult: Option<&str>) -> CallbackOutcome {
        let Some(raw) = wresult.filter(|w| !w.trim().is_empty()) else {
            tracing::debug!("no wresult posted");
            return CallbackOutcome::NoToken;
        };

        let Ok(credential) = self.validator.validate(raw) else {
            return CallbackOutcome::rejected();
        };

        match self.handler.authenticate(&Credentials::from(credential)) {
            Ok(authentication) => {
                tracing::info!(
                    principal = %authentication.principal.id(),
                    "federation login succeeded"
                );
                CallbackOutcome::Authenticated(authentication)
            }
            Err(_) => CallbackOutcome::rejected(),
        }
    }
}
