//! # Exeat API Main Entry Point
//!
//! This is the main entry point for the Exeat API service.

use clap::Parser;
use exeats::{config::ConfigLoader, db, server::run_server, telemetry};
use migration::{Migrator, MigratorTrait};

/// Exeat API service
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Apply pending database migrations and exit
    #[arg(long)]
    migrate_only: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config_loader = ConfigLoader::new();
    let config = config_loader.load()?;

    telemetry::init_tracing(&config)?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Effective configuration");
    }

    let db = db::init_pool(&config).await?;

    Migrator::up(&db, None).await?;
    if cli.migrate_only {
        tracing::info!("Migrations applied; exiting");
        return Ok(());
    }

    run_server(config, db).await
}
