//! XML-DSig algorithm identifiers.
//!
//! Identity providers name their algorithms by URI inside `<ds:DigestMethod>`
//! and `<ds:SignatureMethod>`. These enums map those URIs onto the primitives
//! this crate can evaluate.

use serde::{Deserialize, Serialize};

/// SHA-1 digest URI.
pub const DIGEST_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";
/// SHA-256 digest URI.
pub const DIGEST_SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
/// SHA-384 digest URI.
pub const DIGEST_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#sha384";
/// SHA-512 digest URI.
pub const DIGEST_SHA512: &str = "http://www.w3.org/2001/04/xmlenc#sha512";

/// RSA-SHA1 signature URI.
pub const RSA_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";
/// RSA-SHA256 signature URI.
pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
/// RSA-SHA384 signature URI.
pub const RSA_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384";
/// RSA-SHA512 signature URI.
pub const RSA_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512";

/// Digest algorithms usable in a `<ds:Reference>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-1 (legacy, opt-in only).
    #[serde(rename = "SHA1")]
    Sha1,
    /// SHA-256.
    #[serde(rename = "SHA256")]
    Sha256,
    /// SHA-384.
    #[serde(rename = "SHA384")]
    Sha384,
    /// SHA-512.
    #[serde(rename = "SHA512")]
    Sha512,
}

impl DigestAlgorithm {
    /// Returns the XML-DSig URI for this digest.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::Sha1 => DIGEST_SHA1,
            Self::Sha256 => DIGEST_SHA256,
            Self::Sha384 => DIGEST_SHA384,
            Self::Sha512 => DIGEST_SHA512,
        }
    }

    /// Parses a digest algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            DIGEST_SHA1 => Some(Self::Sha1),
            DIGEST_SHA256 => Some(Self::Sha256),
            DIGEST_SHA384 => Some(Self::Sha384),
            DIGEST_SHA512 => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Returns the output length in bytes.
    #[must_use]
    pub const fn output_len(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Returns true for digests kept only for interoperability.
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        matches!(self, Self::Sha1)
    }
}

/// RSA PKCS#1 v1.5 signature algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    /// RSA with SHA-1 (legacy, opt-in only).
    #[serde(rename = "RS1")]
    RsaSha1,
    /// RSA with SHA-256.
    #[serde(rename = "RS256")]
    RsaSha256,
    /// RSA with SHA-384.
    #[serde(rename = "RS384")]
    RsaSha384,
    /// RSA with SHA-512.
    #[serde(rename = "RS512")]
    RsaSha512,
}

impl SignatureAlgorithm {
    /// Returns the XML-DSig URI for this algorithm.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::RsaSha1 => RSA_SHA1,
            Self::RsaSha256 => RSA_SHA256,
            Self::RsaSha384 => RSA_SHA384,
            Self::RsaSha512 => RSA_SHA512,
        }
    }

    /// Parses a signature algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            RSA_SHA1 => Some(Self::RsaSha1),
            RSA_SHA256 => Some(Self::RsaSha256),
            RSA_SHA384 => Some(Self::RsaSha384),
            RSA_SHA512 => Some(Self::RsaSha512),
            _ => None,
        }
    }

    /// Returns the digest the signature is computed over.
    #[must_use]
    pub const fn digest(self) -> DigestAlgorithm {
        match self {
            Self::RsaSha1 => DigestAlgorithm::Sha1,
            Self::RsaSha256 => DigestAlgorithm::Sha256,
            Self::RsaSha384 => DigestAlgorithm::Sha384,
            Self::RsaSha512 => DigestAlgorithm::Sha512,
        }
    }

    /// Returns true for algorithms kept only for interoperability.
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        self.digest().is_legacy()
    }
}
