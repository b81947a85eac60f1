//! hive - operator CLI for the Hive memory engine
//!
//! Registers agents and drives their hierarchical memories: store, retrieve,
//! search, consolidate, decay and periodic maintenance.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;
mod config;
mod database;

use cli::{Cli, Commands};
use config::{Config, LogFormat, LoggingConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = cli.database {
        config.database.path = path;
    }

    init_tracing(&config.logging)?;

    // Execute command
    match cli.command {
        Commands::Agent(cmd) => commands::agent::execute(cmd, &config),
        Commands::Memory(cmd) => commands::memory::execute(cmd, &config),
        Commands::Maintain { once, interval } => {
            commands::maintain::execute(once, interval, &config).await
        }
        Commands::Version => {
            println!("hive {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.filter)?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
    Ok(())
}
