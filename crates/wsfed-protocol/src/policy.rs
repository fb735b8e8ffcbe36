//! Audience, issuer and time-window checks on a built credential.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use wsfed_core::{FederationConfig, DEFAULT_TOLERANCE_MS};

use crate::types::Credential;

/// The first check a credential failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    /// The token is addressed to another relying party.
    #[error("audience mismatch: expected `{expected}`, got `{}`", .actual.as_deref().unwrap_or("<none>"))]
    AudienceMismatch {
        /// Configured relying party.
        expected: String,
        /// Audience found in the token.
        actual: Option<String>,
    },

    /// The token was issued by another identity provider.
    #[error("issuer mismatch: expected `{expected}`, got `{actual}`")]
    IssuerMismatch {
        /// Configured identity provider.
        expected: String,
        /// Issuer found in the token.
        actual: String,
    },

    /// The token was received at or after `NotOnOrAfter`.
    #[error("token expired at {not_on_or_after}, received at {retrieved_on}")]
    Expired {
        /// End of the validity window.
        not_on_or_after: DateTime<Utc>,
        /// Receipt time.
        retrieved_on: DateTime<Utc>,
    },

    /// The token was received before `NotBefore`, allowing for drift.
    #[error("token not valid before {not_before}, received at {retrieved_on}")]
    NotYetValid {
        /// Start of the validity window.
        not_before: DateTime<Utc>,
        /// Receipt time.
        retrieved_on: DateTime<Utc>,
    },

    /// `IssueInstant` is further from the receipt time than the tolerance.
    #[error("token issued at {issued_on}, outside {tolerance_ms} ms of {retrieved_on}")]
    IssuedOutsideTolerance {
        /// Issue instant.
        issued_on: DateTime<Utc>,
        /// Receipt time.
        retrieved_on: DateTime<Utc>,
        /// Allowed drift.
        tolerance_ms: u64,
    },
}

impl PolicyViolation {
    /// Short machine-readable name of the failed check.
    #[must_use]
    pub const fn check(&self) -> &'static str {
        match self {
            Self::AudienceMismatch { .. } => "audience",
            Self::IssuerMismatch { .. } => "issuer",
            Self::Expired { .. } => "not_on_or_after",
            Self::NotYetValid { .. } => "not_before",
            Self::IssuedOutsideTolerance { .. } => "issue_instant",
        }
    }
}

/// Acceptance rules for credentials from one identity provider.
///
/// Audience and issuer comparisons ignore case character by character,
/// using Unicode case mappings; no multi-character folding is done, so
/// `ß` never matches `SS`. The checks run in a fixed order and
/// stop at the first failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityPolicy {
    expected_audience: String,
    expected_issuer: String,
    tolerance_ms: u64,
    enforce_not_before: bool,
}

impl ValidityPolicy {
    /// Creates a policy with the default tolerance and no early-use check.
    #[must_use]
    pub fn new(expected_audience: impl Into<String>, expected_issuer: impl Into<String>) -> Self {
        Self {
            expected_audience: expected_audience.into(),
            expected_issuer: expected_issuer.into(),
            tolerance_ms: DEFAULT_TOLERANCE_MS,
            enforce_not_before: false,
        }
    }

    /// Builds the policy described by a configuration.
    #[must_use]
    pub fn from_config(config: &FederationConfig) -> Self {
        Self::new(
            config.relying_party_identifier.clone(),
            config.identity_provider_identifier.clone(),
        )
        .with_tolerance_ms(config.tolerance_ms)
        .with_enforce_not_before(config.enforce_not_before)
    }

    /// Sets the clock-drift tolerance.
    #[must_use]
    pub const fn with_tolerance_ms(mut self, tolerance_ms: u64) -> Self {
        self.tolerance_ms = tolerance_ms;
        self
    }

    /// Enables rejection of tokens received before `NotBefore`.
    #[must_use]
    pub const fn with_enforce_not_before(mut self, enforce: bool) -> Self {
        self.enforce_not_before = enforce;
        self
    }

    /// Expected audience.
    #[must_use]
    pub fn expected_audience(&self) -> &str {
        &self.expected_audience
    }

    /// Expected issuer.
    #[must_use]
    pub fn expected_issuer(&self) -> &str {
        &self.expected_issuer
    }

    /// Drift tolerance in milliseconds.
    #[must_use]
    pub const fn tolerance_ms(&self) -> u64 {
        self.tolerance_ms
    }

    /// Whether the early-use check runs.
    #[must_use]
    pub const fn enforces_not_before(&self) -> bool {
        self.enforce_not_before
    }

    /// Checks a credential.
    ///
    /// # Errors
    ///
    /// Returns the first check that failed.
    pub fn check(&self, credential: &Credential) -> Result<(), PolicyViolation> {
        let audience_matches = credential
            .audience()
            .is_some_and(|a| equals_ignore_case(a, &self.expected_audience));
        if !audience_matches {
            return Err(PolicyViolation::AudienceMismatch {
                expected: self.expected_audience.clone(),
                actual: credential.audience().map(str::to_string),
            });
        }

        if !equals_ignore_case(credential.issuer(), &self.expected_issuer) {
            return Err(PolicyViolation::IssuerMismatch {
                expected: self.expected_issuer.clone(),
                actual: credential.issuer().to_string(),
            });
        }

        let retrieved_on = credential.retrieved_on();
        let (earliest, latest) = self.drift_window(retrieved_on);

        if let Some(not_on_or_after) = credential.not_on_or_after() {
            if retrieved_on >= not_on_or_after {
                return Err(PolicyViolation::Expired {
                    not_on_or_after,
                    retrieved_on,
                });
            }
        }

        if self.enforce_not_before {
            if let Some(not_before) = credential.not_before() {
                if latest < not_before {
                    return Err(PolicyViolation::NotYetValid {
                        not_before,
                        retrieved_on,
                    });
                }
            }
        }

        let issued_on = credential.issued_on();
        if issued_on < earliest || issued_on > latest {
            return Err(PolicyViolation::IssuedOutsideTolerance {
                issued_on,
                retrieved_on,
                tolerance_ms: self.tolerance_ms,
            });
        }

        Ok(())
    }

    /// Returns true if every check passes. Failures are logged.
    #[must_use]
    pub fn is_valid(&self, credential: &Credential) -> bool {
        match self.check(credential) {
            Ok(()) => true,
            Err(violation) => {
                tracing::warn!(
                    assertion_id = %credential.id(),
                    check = violation.check(),
                    %violation,
                    "credential rejected by validity policy"
                );
                false
            }
        }
    }

    /// `[at - tolerance, at + tolerance]`, saturating at the representable range.
    fn drift_window(&self, at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let tolerance = i64::try_from(self.tolerance_ms)
            .ok()
            .and_then(Duration::try_milliseconds)
            .unwrap_or(Duration::MAX);
        (
            at.checked_sub_signed(tolerance).unwrap_or(DateTime::<Utc>::MIN_UTC),
            at.checked_add_signed(tolerance).unwrap_or(DateTime::<Utc>::MAX_UTC),
        )
    }
}

fn equals_ignore_case(a: &str, b: &str) -> bool {
    a.chars().count() == b.chars().count()
        && a.chars().zip(b.chars()).all(|(x, y)| {
            x == y || x.to_uppercase().eq(y.to_uppercase()) || x.to_lowercase().eq(y.to_lowercase())
        })
}

/// One-shot form of [`ValidityPolicy::is_valid`] with the early-use check off.
#[must_use]
pub fn is_valid(
    credential: &Credential,
    expected_audience: &str,
    expected_issuer: &str,
    tolerance_ms: u64,
) -> bool {
    ValidityPolicy::new(expected_audience, expected_issuer)
        .with_tolerance_ms(tolerance_ms)
        .is_valid(credential)
}
