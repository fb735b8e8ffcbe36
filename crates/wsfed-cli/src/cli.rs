//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::OutputFormat;

/// wsfed - WS-Federation relying party tools.
#[derive(Debug, Parser)]
#[command(name = "wsfed")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ~/.wsfed/federation.toml).
    #[arg(short, long, env = "WSFED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a token response and print the resulting credential.
    Validate {
        /// File holding the `wresult` value, or `-` for stdin.
        token: String,
    },

    /// Print what a token response claims, without verifying it.
    Inspect {
        /// File holding the `wresult` value, or `-` for stdin.
        token: String,
    },

    /// List the trusted signing certificates.
    Wallet,

    /// Print the effective configuration.
    Config,
}
