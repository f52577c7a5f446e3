//! Command-line interface for hvd-config
//!
//! Provides `env` and `check` subcommands sharing the launcher flag set.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod check;
mod env;
mod flags;

pub use flags::LaunchFlags;

/// Resolve distributed-training launcher parameters into worker environment variables
#[derive(Parser)]
#[command(name = "hvd-config")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the environment variables workers should be launched with
    Env(env::EnvArgs),

    /// Validate the configuration and print the resolved parameters
    Check(check::CheckArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Env(args) => env::run(args),
        Commands::Check(args) => check::run(args),
    }
}
