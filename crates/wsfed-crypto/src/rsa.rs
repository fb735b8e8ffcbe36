//! RSA PKCS#1 v1.5 signatures.
//!
//! Identity providers such as AD FS sign tokens with RSA PKCS#1 v1.5. The
//! verification side accepts moduli from 2048 to 8192 bits, the range
//! aws-lc-rs supports for these padding schemes.

use std::ops::RangeInclusive;

use aws_lc_rs::{
    rand::SystemRandom,
    signature::{self, RsaKeyPair, UnparsedPublicKey},
};

use crate::algorithm::SignatureAlgorithm;
use crate::error::{CryptoError, CryptoResult};

/// Modulus sizes, in bits, that [`RsaPublicKey::verify`] can work with.
pub const RSA_KEY_BITS: RangeInclusive<usize> = 2048..=8192;

/// An RSA public key ready for signature verification.
#[derive(Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    /// DER-encoded `RSAPublicKey` (PKCS#1).
    der: Vec<u8>,
}

impl RsaPublicKey {
    /// Wraps a DER-encoded PKCS#1 `RSAPublicKey`.
    ///
    /// This is the content of the `subjectPublicKey` bit string of an RSA
    /// certificate.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty.
    pub fn from_pkcs1_der(der: &[u8]) -> CryptoResult<Self> {
        if der.is_empty() {
            return Err(CryptoError::InvalidKey("empty RSA public key".to_string()));
        }
        Ok(Self { der: der.to_vec() })
    }

    /// Returns the DER encoding of the key.
    #[must_use]
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    /// Verifies `sig` over `data`.
    ///
    /// Returns `false` for any failure: a wrong key, a corrupted signature or
    /// a key the algorithm cannot use all look the same to the caller.
    #[must_use]
    pub fn verify(&self, algorithm: SignatureAlgorithm, data: &[u8], sig: &[u8]) -> bool {
        let verification_alg = match algorithm {
            SignatureAlgorithm::RsaSha1 => &signature::RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY,
            SignatureAlgorithm::RsaSha256 => &signature::RSA_PKCS1_2048_8192_SHA256,
            SignatureAlgorithm::RsaSha384 => &signature::RSA_PKCS1_2048_8192_SHA384,
            SignatureAlgorithm::RsaSha512 => &signature::RSA_PKCS1_2048_8192_SHA512,
        };

        UnparsedPublicKey::new(verification_alg, &self.der)
            .verify(data, sig)
            .is_ok()
    }
}

impl std::fmt::Debug for RsaPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaPublicKey")
            .field("der_len", &self.der.len())
            .finish()
    }
}

/// Signs data with an RSA private key.
///
/// # Arguments
///
/// * `pkcs8_der` - RSA private key in PKCS#8 DER format
/// * `algorithm` - Signature algorithm (SHA-1 is not available for signing)
/// * `data` - Data to sign
///
/// # Errors
///
/// Returns an error if the key cannot be parsed or signing fails.
pub fn rsa_sign(
    pkcs8_der: &[u8],
    algorithm: SignatureAlgorithm,
    data: &[u8],
) -> CryptoResult<Vec<u8>> {
    let key_pair = RsaKeyPair::from_pkcs8(pkcs8_der)
        .map_err(|e| CryptoError::InvalidKey(format!("invalid RSA key: {e}")))?;

    let padding = match algorithm {
        SignatureAlgorithm::RsaSha256 => &signature::RSA_PKCS1_SHA256,
        SignatureAlgorithm::RsaSha384 => &signature::RSA_PKCS1_SHA384,
        SignatureAlgorithm::RsaSha512 => &signature::RSA_PKCS1_SHA512,
        SignatureAlgorithm::RsaSha1 => {
            return Err(CryptoError::UnsupportedAlgorithm(
                "SHA-1 signing is not supported".to_string(),
            ));
        }
    };

    let rng = SystemRandom::new();
    let mut sig = vec![0u8; key_pair.public_modulus_len()];
    key_pair
        .sign(padding, &rng, data, &mut sig)
        .map_err(|e| CryptoError::Signing(format!("RSA signing failed: {e}")))?;

    Ok(sig)
}
