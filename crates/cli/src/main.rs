//! Papelaria Santa Fé CLI - Database provisioning and maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Create tables, indexes and extensions (safe to repeat)
//! papelaria setup
//!
//! # Insert categories and demonstration products (safe to repeat)
//! papelaria seed
//! papelaria seed --catalog catalog.yaml
//!
//! # Show which schema objects exist
//! papelaria status
//!
//! # Delete expired web sessions
//! papelaria sessions prune
//! ```
//!
//! Every command reads `DATABASE_URL` (and `PAPELARIA_ENV`) from the
//! environment or a `.env` file, and exits 1 on any failure.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "papelaria")]
#[command(author, version, about = "Papelaria Santa Fé CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema if it does not exist
    Setup,
    /// Seed categories and demonstration products
    Seed {
        /// YAML catalog to load instead of the built-in one
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
    /// Report which schema objects are present
    Status,
    /// Manage stored web sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
}

#[derive(Subcommand)]
enum SessionsAction {
    /// Delete sessions whose expiry has passed
    Prune,
}

#[tokio::main]
async fn main() {
    papelaria_storefront::telemetry::init_tracing("papelaria=info,papelaria_storefront=info");

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Setup => commands::setup::run().await?,
        Commands::Seed { catalog } => commands::seed::run(catalog.as_deref()).await?,
        Commands::Status => commands::status::run().await?,
        Commands::Sessions { action } => match action {
            SessionsAction::Prune => commands::sessions::prune().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seed_with_catalog() {
        let cli = Cli::try_parse_from(["papelaria", "seed", "--catalog", "demo.yaml"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Seed { catalog: Some(ref p) }) if p == &PathBuf::from("demo.yaml")
        ));
    }

    #[test]
    fn test_parse_sessions_prune() {
        let cli = Cli::try_parse_from(["papelaria", "sessions", "prune"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Sessions {
                action: SessionsAction::Prune
            })
        ));
    }
}
