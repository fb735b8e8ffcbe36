//! Parse, verify, build and check a token response in one call.
//!
//! Every per-request failure ends as a [`Rejection`]. Its `Display` output is
//! meant for logs; end users only ever see [`Rejection::user_message`].

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::bootstrap::{self, SecurityPolicy};
use crate::context::ValidationContext;
use crate::error::{ProtocolError, ProtocolResult, SignatureError, TokenParseError};
use crate::parser::parse_token;
use crate::policy::PolicyViolation;
use crate::signature::SignatureVerifier;
use crate::types::{Credential, CredentialBuilder};

/// Text shown to users for every rejected token.
pub const USER_MESSAGE: &str = "federation login failed";

/// Why a token was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The payload is not a usable token response.
    #[error("token could not be parsed: {0}")]
    ParseFailure(#[from] TokenParseError),

    /// No trusted key validates the assertion signature.
    #[error("token signature is invalid: {0}")]
    SignatureInvalid(#[from] SignatureError),

    /// The credential failed the validity policy.
    #[error("token rejected by policy: {0}")]
    PolicyViolation(#[from] PolicyViolation),
}

impl Rejection {
    /// Generic text safe to show to the end user.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        USER_MESSAGE
    }

    /// Stage at which the token was rejected.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::ParseFailure(_) => "parse",
            Self::SignatureInvalid(_) => "signature",
            Self::PolicyViolation(_) => "policy",
        }
    }
}

/// Validates token responses against a fixed context.
#[derive(Debug, Clone)]
pub struct FederationValidator {
    context: ValidationContext,
    verifier: SignatureVerifier,
}

impl FederationValidator {
    /// Creates a validator using the process-wide security policy.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::NotInitialized`] before
    /// [`initialize`](crate::initialize) has run.
    pub fn new(context: ValidationContext) -> ProtocolResult<Self> {
        let policy = bootstrap::active_policy().ok_or(ProtocolError::NotInitialized)?;
        Ok(Self::with_security_policy(context, policy))
    }

    /// Creates a validator with an explicit security policy.
    #[must_use]
    pub const fn with_security_policy(context: ValidationContext, policy: SecurityPolicy) -> Self {
        Self {
            context,
            verifier: SignatureVerifier::new(policy),
        }
    }

    /// Settings in use.
    #[must_use]
    pub const fn context(&self) -> &ValidationContext {
        &self.context
    }

    /// Validates a raw `wresult` payload received now.
    ///
    /// # Errors
    ///
    /// Returns the first stage that rejected the token.
    pub fn validate(&self, raw: &str) -> Result<Credential, Rejection> {
        self.validate_at(raw, Utc::now())
    }

    /// Validates a payload as if it had been received at `retrieved_on`.
    ///
    /// # Errors
    ///
    /// Returns the first stage that rejected the token.
    pub fn validate_at(&self, raw: &str, retrieved_on: DateTime<Utc>) -> Result<Credential, Rejection> {
        let result = self.run(raw, retrieved_on);
        if let Err(rejection) = &result {
            tracing::warn!(stage = rejection.stage(), reason = %rejection, "federation token rejected");
        }
        result
    }

    fn run(&self, raw: &str, retrieved_on: DateTime<Utc>) -> Result<Credential, Rejection> {
        let assertion = parse_token(raw)?;
        tracing::debug!(assertion_id = %assertion.id, issuer = %assertion.issuer, "token parsed");

        self.verifier.verify(&assertion, self.context.wallet())?;

        let credential = CredentialBuilder::from_assertion(&assertion).build_at(retrieved_on);
        self.context.policy().check(&credential)?;

        let credential = match self.context.mutator() {
            Some(mutator) => credential.map_attributes(mutator),
            None => credential,
        };

        tracing::debug!(
            assertion_id = %credential.id(),
            attributes = credential.attributes().len(),
            "token accepted"
        );
        Ok(credential)
    }
}

/// Validates a raw token response with the process-wide security policy.
///
/// Fails closed with a signature rejection before
/// [`initialize`](crate::initialize) has run.
///
/// # Errors
///
/// Returns the first stage that rejected the token.
pub fn validate(raw: &str, context: &ValidationContext) -> Result<Credential, Rejection> {
    let policy = bootstrap::active_policy();
    match policy {
        Some(policy) => FederationValidator::with_security_policy(context.clone(), policy).validate(raw),
        None => {
            tracing::error!("token validation attempted before XML security initialization");
            Err(Rejection::SignatureInvalid(SignatureError::NotInitialized))
        }
    }
}
