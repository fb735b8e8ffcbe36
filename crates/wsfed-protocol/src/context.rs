//! Process-wide validation settings.

use std::fmt;
use std::sync::Arc;

use wsfed_core::FederationConfig;

use crate::error::{ProtocolError, ProtocolResult};
use crate::mutator::AttributeMutator;
use crate::policy::ValidityPolicy;
use crate::wallet::CertificateWallet;

/// Everything needed to validate tokens from one identity provider.
///
/// Built once at startup and shared read-only between requests; cloning is
/// cheap.
#[derive(Clone)]
pub struct ValidationContext {
    wallet: Arc<CertificateWallet>,
    policy: ValidityPolicy,
    identity_attribute: String,
    mutator: Option<Arc<dyn AttributeMutator>>,
}

impl ValidationContext {
    /// Creates a context from already loaded parts.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::EmptyWallet`] if `wallet` holds no keys.
    pub fn new(
        wallet: CertificateWallet,
        policy: ValidityPolicy,
        identity_attribute: impl Into<String>,
    ) -> ProtocolResult<Self> {
        if wallet.is_empty() {
            return Err(ProtocolError::EmptyWallet);
        }
        Ok(Self {
            wallet: Arc::new(wallet),
            policy,
            identity_attribute: identity_attribute.into(),
            mutator: None,
        })
    }

    /// Validates `config` and loads its signing certificates.
    ///
    /// # Errors
    ///
    /// Fails on incomplete configuration, on any certificate that cannot be
    /// loaded and on an empty certificate list.
    pub fn from_config(config: &FederationConfig) -> ProtocolResult<Self> {
        config.validate().inspect_err(|e| {
            tracing::error!(error = %e, "invalid federation configuration");
        })?;

        let wallet = CertificateWallet::load(&config.signing_certificate_files)?;
        tracing::info!(
            certificates = wallet.len(),
            issuer = %config.identity_provider_identifier,
            audience = %config.relying_party_identifier,
            "federation validation context ready"
        );

        Self::new(
            wallet,
            ValidityPolicy::from_config(config),
            config.identity_attribute.clone(),
        )
    }

    /// Installs an attribute mutator applied to accepted credentials.
    #[must_use]
    pub fn with_mutator(mut self, mutator: impl AttributeMutator + 'static) -> Self {
        self.mutator = Some(Arc::new(mutator));
        self
    }

    /// Trusted signing keys.
    #[must_use]
    pub fn wallet(&self) -> &CertificateWallet {
        &self.wallet
    }

    /// Acceptance rules.
    #[must_use]
    pub const fn policy(&self) -> &ValidityPolicy {
        &self.policy
    }

    /// Attribute holding the principal identifier.
    #[must_use]
    pub fn identity_attribute(&self) -> &str {
        &self.identity_attribute
    }

    /// Installed attribute mutator, if any.
    #[must_use]
    pub fn mutator(&self) -> Option<&dyn AttributeMutator> {
        self.mutator.as_deref()
    }
}

impl fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("certificates", &self.wallet.len())
            .field("policy", &self.policy)
            .field("identity_attribute", &self.identity_attribute)
            .field("mutator", &self.mutator.is_some())
            .finish()
    }
}
