//! # wsfed
//!
//! Command-line tools for the WS-Federation bridge.

#![forbid(unsafe_code)]

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wsfed_cli::{
    cli::{Cli, Command},
    commands::{run_config, run_inspect, run_validate, run_wallet},
    config,
    output::error,
    CliResult,
};

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(&cli) {
        error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    // Inspection works without any configuration.
    let load = || config::load(cli.config.as_deref());
    match &cli.command {
        Command::Inspect { token } => run_inspect(token, cli.output),
        Command::Validate { token } => run_validate(token, &load()?, cli.output),
        Command::Wallet => run_wallet(&load()?, cli.output),
        Command::Config => run_config(&load()?, cli.output),
    }
}
