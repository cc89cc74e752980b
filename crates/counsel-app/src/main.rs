//! Counsel application binary - composition root.
//!
//! Ties the Counsel crates together into a single executable:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Open the SQLite database and import the seed file, if any
//! 3. Load the knowledge base into the in-memory document index
//! 4. Start the axum REST API server

mod cli;
mod seed;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use counsel_api::state::AppState;
use counsel_core::config::CounselConfig;
use counsel_storage::{Database, DocumentRepository, DATABASE_FILE};
use counsel_vector::DocumentIndex;

use crate::cli::CliArgs;

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = CounselConfig::load_or_default(&config_file);
    config.server.port = args.resolve_port(config.server.port);
    if let Some(dir) = args.resolve_data_dir() {
        config.general.data_dir = dir;
    }
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }

    // Tracing. RUST_LOG wins over the configured level.
    let default_level = config.general.log_level.clone();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!("Starting Counsel v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    // Storage.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    let db_path = data_dir.join(DATABASE_FILE);
    let database = match Database::new(&db_path) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            tracing::error!(path = %db_path.display(), error = %e, "Failed to open database");
            return Err(e.into());
        }
    };
    tracing::info!(path = %db_path.display(), "SQLite database opened");

    let documents = DocumentRepository::new(Arc::clone(&database));

    // Seeding.
    if let Some(seed_path) = args.resolve_seed_file(config.knowledge.seed_file.as_deref()) {
        if let Err(e) = seed::seed_from_file(&documents, &seed_path) {
            tracing::error!(path = %seed_path.display(), error = %e, "Failed to seed knowledge base");
            return Err(e.into());
        }
    }

    // Knowledge base.
    let index = DocumentIndex::new();
    let loaded = index.load(documents.list_all()?);
    tracing::info!(documents = loaded, "Document index loaded");
    if loaded == 0 {
        tracing::warn!("Knowledge base is empty; information questions will find nothing");
    }

    if !config.chat.enabled {
        tracing::warn!("Chat is disabled in config; turns will be rejected");
    }

    // === API server ===

    let state = AppState::with_database(config, database, index);
    if let Err(e) = counsel_api::start_server(state).await {
        tracing::error!(error = %e, "API server stopped");
        return Err(e.into());
    }

    Ok(())
}
