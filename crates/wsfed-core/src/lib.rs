//! # wsfed-core
//!
//! Configuration and error handling shared by the WS-Federation bridge crates.
//!
//! The relying party is configured once at startup: which identity provider
//! it trusts, which certificates that provider signs with, and how strict the
//! token validity policy is. Everything here is plain data; loading the
//! certificates themselves happens in `wsfed-protocol`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod error;

pub use config::{FederationConfig, DEFAULT_TOLERANCE_MS};
pub use error::{Error, Result};
