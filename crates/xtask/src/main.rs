//! Development tasks for the stat engine
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Evaluate, InspectFlags, RepairFlags};

/// Development tasks for the stat engine
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for stat content", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Build a registry from content files and print every aggregate
    Evaluate(Evaluate),

    /// Restore a persisted flag set against a category domain
    RepairFlags(RepairFlags),

    /// Show the active and pending categories of a persisted flag set
    InspectFlags(InspectFlags),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for RUST_LOG and other env vars)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Evaluate(cmd) => cmd.execute(),
        Command::RepairFlags(cmd) => cmd.execute(),
        Command::InspectFlags(cmd) => cmd.execute(),
    }
}
