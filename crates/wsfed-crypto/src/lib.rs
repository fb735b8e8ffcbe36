//! # wsfed-crypto
//!
//! Cryptographic primitives for the WS-Federation bridge, backed by aws-lc-rs.
//!
//! The bridge is a relying party: it only ever verifies signatures produced
//! by an identity provider. The algorithm set is therefore dictated by what
//! identity providers emit in XML-DSig blocks:
//!
//! - RSA PKCS#1 v1.5 with SHA-256, SHA-384 or SHA-512
//! - SHA-1 variants, only when a caller opts in to legacy algorithms
//!
//! Signing is provided for tooling and test fixtures.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod algorithm;
pub mod error;
pub mod hash;
pub mod rsa;

pub use algorithm::{DigestAlgorithm, SignatureAlgorithm};
pub use error::{CryptoError, CryptoResult};
pub use hash::{digest, sha256, sha384, sha512};
pub use rsa::{rsa_sign, RsaPublicKey, RSA_KEY_BITS};
