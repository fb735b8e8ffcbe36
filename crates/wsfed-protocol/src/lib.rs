//! WS-Federation token validation for relying parties.
//!
//! This crate turns the `wresult` payload an identity provider posts back
//! into a trusted [`Credential`]:
//!
//! - **Token parsing** - WS-Trust response envelope and SAML 1.1 assertion
//! - **Signature verification** - enveloped XML-DSig against trusted keys
//! - **Credential building** - attributes and validity window
//! - **Validity policy** - audience, issuer, expiry and clock drift
//!
//! # Architecture
//!
//! - [`xml`] - Namespace-aware XML tree and exclusive canonicalization
//! - [`wallet`] - Trusted signing certificates
//! - [`parser`] - Token response parsing
//! - [`signature`] - Signature verification
//! - [`types`] - Assertion and credential types
//! - [`policy`] - Acceptance checks on credentials
//! - [`pipeline`] - All stages in one call
//!
//! # Example
//!
//! ```rust,ignore
//! use wsfed_protocol::{FederationValidator, ValidationContext};
//!
//! wsfed_protocol::initialize();
//! let context = ValidationContext::from_config(&config)?;
//! let validator = FederationValidator::new(context)?;
//!
//! match validator.validate(&wresult) {
//!     Ok(credential) => println!("{credential}"),
//!     Err(rejection) => eprintln!("{}", rejection.user_message()),
//! }
//! ```
//!
//! # Specifications
//!
//! - [WS-Federation 1.2](http://docs.oasis-open.org/wsfed/federation/v1.2/)
//! - [SAML 1.1 Core](https://www.oasis-open.org/committees/download.php/3406/oasis-sstc-saml-core-1.1.pdf)
//! - [XML Signature](https://www.w3.org/TR/xmldsig-core1/)
//! - [Exclusive XML Canonicalization](https://www.w3.org/TR/xml-exc-c14n/)

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod bootstrap;
pub mod context;
pub mod error;
pub mod mutator;
pub mod parser;
pub mod pipeline;
pub mod policy;
pub mod signature;
pub mod types;
pub mod wallet;
pub mod xml;

pub use bootstrap::{initialize, initialize_with, is_initialized, SecurityPolicy};
pub use context::ValidationContext;
pub use error::{CertificateLoadError, ProtocolError, ProtocolResult, SignatureError, TokenParseError};
pub use mutator::{AttributeMutator, NoopMutator};
pub use parser::{parse_token, parse_token_bytes};
pub use pipeline::{validate, FederationValidator, Rejection};
pub use policy::{PolicyViolation, ValidityPolicy};
pub use signature::{verify_signature, SignatureVerifier};
pub use types::*;
pub use wallet::{CertificateWallet, TrustedCertificate};
