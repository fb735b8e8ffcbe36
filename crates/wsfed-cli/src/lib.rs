//! # wsfed-cli
//!
//! Operator tools for the WS-Federation bridge.
//!
//! This crate provides command-line utilities for:
//! - Validating a captured `wresult` token against the configured wallet
//! - Inspecting a token without verifying it
//! - Listing the trusted signing certificates
//! - Showing the effective configuration

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use error::{CliError, CliResult};
