//! Enveloped signature validation against the trusted wallet.

use crate::bootstrap::{self, SecurityPolicy};
use crate::error::SignatureError;
use crate::types::Assertion;
use crate::wallet::{CertificateWallet, TrustedCertificate};
use crate::xml::{canonicalize, C14nMethod};

use super::SignatureBlock;

/// Verifies assertion signatures under one security policy.
#[derive(Debug, Clone, Copy)]
pub struct SignatureVerifier {
    policy: SecurityPolicy,
}

impl SignatureVerifier {
    /// Creates a verifier with an explicit policy.
    #[must_use]
    pub const fn new(policy: SecurityPolicy) -> Self {
        Self { policy }
    }

    /// Creates a verifier with the process-wide policy.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::NotInitialized`] before
    /// [`initialize`](crate::initialize) has run.
    pub fn from_active_policy() -> Result<Self, SignatureError> {
        bootstrap::active_policy()
            .map(Self::new)
            .ok_or(SignatureError::NotInitialized)
    }

    /// Checks the assertion's enveloped signature.
    ///
    /// Every wallet entry is tried in order; the first one that validates is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns why the signature was not accepted.
    pub fn verify<'w>(
        &self,
        assertion: &Assertion,
        wallet: &'w CertificateWallet,
    ) -> Result<&'w TrustedCertificate, SignatureError> {
        if wallet.is_empty() {
            return Err(SignatureError::EmptyWallet);
        }

        let mut signatures = assertion
            .element()
            .children_named(crate::types::XMLDSIG_NS, "Signature");
        let signature = signatures.next().ok_or(SignatureError::Missing)?;
        if signatures.next().is_some() {
            return Err(SignatureError::Malformed(
                "assertion carries more than one Signature".to_string(),
            ));
        }

        let block = SignatureBlock::parse(signature)?;
        self.check_algorithms(&block)?;

        let expected_uri = format!("#{}", assertion.id);
        if block.reference_uri != expected_uri {
            return Err(SignatureError::ReferenceMismatch(block.reference_uri));
        }

        // A bare `#id` reference drops comments even under `#WithComments`.
        let referenced = canonicalize(
            assertion.element(),
            C14nMethod::Exclusive,
            &block.reference_prefixes,
            Some(signature),
        );
        let digest = wsfed_crypto::digest(block.digest_algorithm, referenced.as_bytes());
        if digest != block.digest_value {
            return Err(SignatureError::DigestMismatch);
        }

        let signed_info = canonicalize(
            block.signed_info,
            block.canonicalization,
            &block.canonicalization_prefixes,
            None,
        );

        for (index, cert) in wallet.iter().enumerate() {
            if cert
                .public_key()
                .verify(block.algorithm, signed_info.as_bytes(), &block.signature_value)
            {
                tracing::debug!(
                    assertion_id = %assertion.id,
                    key_index = index,
                    subject = %cert.subject(),
                    "signature validated"
                );
                return Ok(cert);
            }
            tracing::debug!(
                assertion_id = %assertion.id,
                key_index = index,
                "signature does not match trusted key"
            );
        }

        Err(SignatureError::NoMatchingKey)
    }

    fn check_algorithms(&self, block: &SignatureBlock<'_>) -> Result<(), SignatureError> {
        if self.policy.allow_sha1 {
            return Ok(());
        }
        if block.algorithm.is_legacy() {
            return Err(SignatureError::LegacyAlgorithm(block.algorithm.uri().to_string()));
        }
        if block.digest_algorithm.is_legacy() {
            return Err(SignatureError::LegacyAlgorithm(
                block.digest_algorithm.uri().to_string(),
            ));
        }
        Ok(())
    }
}

/// Returns true if a wallet key validates the assertion's signature.
///
/// Fails closed before [`initialize`](crate::initialize) has run, for an
/// unsigned assertion and for an empty wallet.
#[must_use]
pub fn verify_signature(assertion: &Assertion, wallet: &CertificateWallet) -> bool {
    let outcome = SignatureVerifier::from_active_policy()
        .and_then(|verifier| verifier.verify(assertion, wallet));

    match outcome {
        Ok(_) => true,
        Err(reason) => {
            tracing::warn!(
                assertion_id = %assertion.id,
                issuer = %assertion.issuer,
                %reason,
                "assertion signature rejected"
            );
            false
        }
    }
}
