//! Process-wide XML security initialization.
//!
//! Verification reads a policy that is fixed once at startup. The first call
//! to [`initialize`] or [`initialize_with`] installs it; later calls leave it
//! untouched and return the policy already in force. Until then every
//! signature check fails.

use once_cell::sync::OnceCell;
use serde::Serialize;

static ACTIVE_POLICY: OnceCell<SecurityPolicy> = OnceCell::new();

/// Algorithm policy applied to every signature check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SecurityPolicy {
    /// Accept `rsa-sha1` signatures and `sha1` reference digests.
    pub allow_sha1: bool,
}

impl SecurityPolicy {
    /// Sets whether SHA-1 based algorithms are accepted.
    #[must_use]
    pub const fn with_allow_sha1(mut self, allow: bool) -> Self {
        self.allow_sha1 = allow;
        self
    }
}

/// Initializes XML security with the default policy.
pub fn initialize() -> SecurityPolicy {
    initialize_with(SecurityPolicy::default())
}

/// Initializes XML security with `policy`.
///
/// Returns the policy in force, which is `policy` only on the first call.
pub fn initialize_with(policy: SecurityPolicy) -> SecurityPolicy {
    let active = *ACTIVE_POLICY.get_or_init(|| {
        tracing::debug!(allow_sha1 = policy.allow_sha1, "XML security initialized");
        policy
    });
    if active != policy {
        tracing::warn!(
            requested_allow_sha1 = policy.allow_sha1,
            active_allow_sha1 = active.allow_sha1,
            "XML security already initialized; keeping the active policy"
        );
    }
    active
}

/// Returns the active policy, or `None` before initialization.
#[must_use]
pub fn active_policy() -> Option<SecurityPolicy> {
    ACTIVE_POLICY.get().copied()
}

/// Returns true once [`initialize`] or [`initialize_with`] has run.
#[must_use]
pub fn is_initialized() -> bool {
    ACTIVE_POLICY.get().is_some()
}
