//! ankr application binary - composition root.
//!
//! 1. Parse the CLI and load configuration from TOML
//! 2. Open the SQLite database (migrations run on open)
//! 3. Build the shared API state (executors, lifecycle, pump, chat)
//! 4. Either serve the HTTP API or drain the pump once and exit

mod cli;

use std::sync::Arc;

use clap::Parser;

use ankr_api::state::AppState;
use ankr_core::config::AnkrConfig;
use ankr_storage::Database;

use crate::cli::{CliArgs, Command};

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = AnkrConfig::load_or_default(&config_file);
    config.general.port = args.resolve_port(config.general.port);
    config.general.log_level = args.resolve_log_level(&config.general.log_level);

    init_tracing(&config.general.log_level);
    tracing::info!("Starting ankr v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    // Storage.
    let data_dir = args.resolve_data_dir(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }
    let db_path = data_dir.join("ankr.db");
    let database = Arc::new(Database::new(&db_path)?);
    tracing::info!(path = %db_path.display(), "SQLite database opened");

    let state = AppState::new(&config, database);

    match args.command() {
        Command::Serve => {
            ankr_api::start_server(&config, state).await?;
        }
        Command::Pump { limit, executor } => {
            let report = state.pump.pump(limit, executor.as_deref()).await?;
            tracing::info!(processed = report.processed, "Pump finished");
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
