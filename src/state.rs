//! Shared state for request handlers.

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::delivery::{ArtifactNamer, UuidNamer};

/// State injected into every handler via `axum::extract::State`.
#[derive(Clone)]
pub struct AppState {
    /// Immutable service configuration.
    pub config: Arc<ServiceConfig>,
    /// Token source for output file names.
    pub namer: Arc<dyn ArtifactNamer>,
}

impl AppState {
    /// Creates state with random output names.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_namer(config, Arc::new(UuidNamer))
    }

    /// Creates state with a caller-chosen namer.
    pub fn with_namer(config: ServiceConfig, namer: Arc<dyn ArtifactNamer>) -> Self {
        Self {
            config: Arc::new(config),
            namer,
        }
    }
}
