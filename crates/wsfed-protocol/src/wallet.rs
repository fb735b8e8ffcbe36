//! Trusted signing certificates.
//!
//! The wallet is loaded once from the configured certificate files and never
//! changes afterwards. Entries keep the configured order, which is the order
//! the verifier tries them in.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use x509_parser::pem::parse_x509_pem;
use x509_parser::public_key::PublicKey;

use wsfed_crypto::{RsaPublicKey, RSA_KEY_BITS};

use crate::error::CertificateLoadError;

/// One trusted certificate reduced to what verification needs.
#[derive(Debug, Clone)]
pub struct TrustedCertificate {
    source: PathBuf,
    subject: String,
    not_after: Option<DateTime<Utc>>,
    key_bits: usize,
    fingerprint: String,
    key: RsaPublicKey,
}

impl TrustedCertificate {
    /// Reads a PEM or DER certificate file.
    ///
    /// # Errors
    ///
    /// See [`CertificateLoadError`].
    pub fn from_file(path: &Path) -> Result<Self, CertificateLoadError> {
        let bytes = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                CertificateLoadError::NotFound(path.to_path_buf())
            } else {
                CertificateLoadError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_bytes(&bytes, path)
    }

    /// Parses certificate bytes; `source` is used for reporting only.
    ///
    /// # Errors
    ///
    /// See [`CertificateLoadError`]. RSA keys outside [`RSA_KEY_BITS`] are
    /// reported as an unsupported key algorithm.
    pub fn from_bytes(bytes: &[u8], source: &Path) -> Result<Self, CertificateLoadError> {
        let malformed = |reason: String| CertificateLoadError::Malformed {
            path: source.to_path_buf(),
            reason,
        };

        let der = if bytes.windows(10).any(|w| w == b"-----BEGIN") {
            let (rest, pem) = parse_x509_pem(bytes).map_err(|e| malformed(format!("invalid PEM: {e}")))?;
            if pem.label != "CERTIFICATE" {
                return Err(malformed(format!("unexpected PEM block `{}`", pem.label)));
            }
            if rest.windows(10).any(|w| w == b"-----BEGIN") {
                return Err(malformed("more than one PEM block".to_string()));
            }
            pem.contents
        } else {
            bytes.to_vec()
        };

        let (rest, cert) = x509_parser::parse_x509_certificate(&der)
            .map_err(|e| malformed(format!("invalid X.509 certificate: {e}")))?;
        if !rest.is_empty() {
            return Err(malformed("trailing data after certificate".to_string()));
        }

        let spki = cert.public_key();
        let key_bits = match spki.parsed() {
            Ok(PublicKey::RSA(rsa)) => rsa.key_size(),
            Ok(PublicKey::EC(_)) => return Err(unsupported(source, "EC")),
            Ok(PublicKey::DSA(_)) => return Err(unsupported(source, "DSA")),
            Err(e) => return Err(malformed(format!("unreadable public key: {e}"))),
            Ok(_) => return Err(unsupported(source, &spki.algorithm.algorithm.to_id_string())),
        };
        if !RSA_KEY_BITS.contains(&key_bits) {
            return Err(unsupported(source, &format!("RSA-{key_bits}")));
        }
        let key = RsaPublicKey::from_pkcs1_der(&spki.subject_public_key.data)
            .map_err(|e| malformed(e.to_string()))?;

        let fingerprint = wsfed_crypto::sha256(&der)
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(":");

        Ok(Self {
            source: source.to_path_buf(),
            subject: cert.subject().to_string(),
            not_after: DateTime::from_timestamp(cert.validity().not_after.timestamp(), 0),
            key_bits,
            fingerprint,
            key,
        })
    }

    /// File the certificate was loaded from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Subject distinguished name.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// End of the certificate validity period.
    #[must_use]
    pub const fn not_after(&self) -> Option<DateTime<Utc>> {
        self.not_after
    }

    /// RSA modulus size in bits.
    #[must_use]
    pub const fn key_bits(&self) -> usize {
        self.key_bits
    }

    /// SHA-256 fingerprint of the DER encoding, colon-separated hex.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Verification key.
    #[must_use]
    pub const fn public_key(&self) -> &RsaPublicKey {
        &self.key
    }
}

fn unsupported(source: &Path, algorithm: &str) -> CertificateLoadError {
    CertificateLoadError::UnsupportedKeyAlgorithm {
        path: source.to_path_buf(),
        algorithm: algorithm.to_string(),
    }
}

/// Ordered, immutable set of trusted signing keys.
#[derive(Debug, Clone, Default)]
pub struct CertificateWallet {
    entries: Vec<TrustedCertificate>,
}

impl CertificateWallet {
    /// Loads every certificate in `paths`, keeping their order.
    ///
    /// # Errors
    ///
    /// Fails on the first file that cannot be loaded.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self, CertificateLoadError> {
        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let cert = TrustedCertificate::from_file(path.as_ref()).inspect_err(|e| {
                tracing::error!(error = %e, "failed to load signing certificate");
            })?;

            if cert.not_after.is_some_and(|t| t < Utc::now()) {
                tracing::warn!(
                    path = %cert.source.display(),
                    subject = %cert.subject,
                    "signing certificate has expired"
                );
            }
            tracing::debug!(
                path = %cert.source.display(),
                subject = %cert.subject,
                key_bits = cert.key_bits,
                "loaded signing certificate"
            );
            entries.push(cert);
        }
        Ok(Self { entries })
    }

    /// Number of trusted keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no key is trusted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in trust order.
    pub fn iter(&self) -> std::slice::Iter<'_, TrustedCertificate> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a CertificateWallet {
    type Item = &'a TrustedCertificate;
    type IntoIter = std::slice::Iter<'a, TrustedCertificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
