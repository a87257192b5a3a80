//! Upload service that sorts case-record CSVs into SUW / MUW / Mild workbooks.
//!
//! Each uploaded CSV is validated against a fixed column set, split by its
//! Last Weight Zscore into three severity buckets and rendered as an XLSX
//! workbook with one styled table per bucket. Batches are bundled into a ZIP.

pub mod commands;
pub mod config;
pub mod delivery;
pub mod error;
pub mod ingest;
pub mod partition;
pub mod pipeline;
pub mod render;
pub mod state;

#[cfg(test)]
mod fixtures;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServiceConfig;
use crate::error::AppError;
use crate::state::AppState;

pub use crate::commands::router;

/// Prepares the working directory and serves HTTP until the process stops.
pub async fn run(config: ServiceConfig) -> Result<(), AppError> {
    tokio::fs::create_dir_all(&config.working_dir)
        .await
        .map_err(|e| {
            AppError::Config(format!(
                "Failed to create working directory {}: {}",
                config.working_dir.display(),
                e
            ))
        })?;

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", config.bind_addr, e)))?;

    info!(
        "[HTTP] Listening on {} (working dir {}, invalid scores: {:?})",
        config.bind_addr,
        config.working_dir.display(),
        config.on_invalid_score
    );

    axum::serve(listener, router(AppState::new(config)))
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))
}
