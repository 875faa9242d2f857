//! # pointboard-server
//!
//! Real-time leaderboard server.
//!
//! This binary provides:
//! - **Award pipeline**: random 1-10 point claims with an atomic increment
//!   and an append-only audit log
//! - **Live rankings**: dense 1-based ranks recomputed on every mutation and
//!   broadcast to all connected WebSocket observers
//! - **REST API** (axum) for user admin, claims, history, and statistics
//! - **SQLite persistence** via the `pointboard-store` crate

mod api;
mod award;
mod broadcast;
mod config;
mod error;
mod seed;
mod service;
mod ws;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pointboard_store::Database;

use crate::api::AppState;
use crate::award::UniformPointSource;
use crate::broadcast::RankingUpdates;
use crate::config::ServerConfig;
use crate::service::Leaderboard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pointboard_server=debug")),
        )
        .init();

    info!("Starting pointboard server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Open the store and seed the default roster if needed
    // -----------------------------------------------------------------------
    let db = Database::open_at(&config.db_path)?;

    if config.seed_users {
        seed::seed_default_users(&db)?;
    }

    // -----------------------------------------------------------------------
    // 4. Wire up the service and its collaborators
    // -----------------------------------------------------------------------
    let leaderboard = Leaderboard::new(
        Arc::new(Mutex::new(db)),
        RankingUpdates::new(),
        Arc::new(UniformPointSource),
    );

    let state = AppState::new(leaderboard);

    // -----------------------------------------------------------------------
    // 5. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    // tokio::select! ensures that if either the HTTP server or a shutdown
    // signal arrives, we exit cleanly.
    tokio::select! {
        result = api::serve(state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
