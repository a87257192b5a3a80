//! HTTP command handlers.
//!
//! | Method | Path      | Description                                  |
//! |--------|-----------|----------------------------------------------|
//! | `POST` | `/upload` | Process a multipart batch of case-record CSVs |
//! | `GET`  | `/health` | Liveness probe                               |

pub mod health;
pub mod upload;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub use health::health;
pub use upload::{process_batch, upload_files, BatchOutcome, ProcessedFile, UploadManifest};

/// Builds the service router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/upload", post(upload_files))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
