//! Service configuration.
//!
//! Defaults suit a local deployment; every field can be overridden through
//! `CASE_SORTER_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Default working directory for generated files.
pub const DEFAULT_WORKING_DIR: &str = "processed";

/// Default request body limit (64 MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

const ENV_BIND: &str = "CASE_SORTER_BIND";
const ENV_WORKING_DIR: &str = "CASE_SORTER_WORKING_DIR";
const ENV_ON_INVALID_SCORE: &str = "CASE_SORTER_ON_INVALID_SCORE";
const ENV_MAX_UPLOAD_BYTES: &str = "CASE_SORTER_MAX_UPLOAD_BYTES";
const ENV_DELIVERY: &str = "CASE_SORTER_DELIVERY";

// ─────────────────────────────────────────────────────────────────────────────
// Policies
// ─────────────────────────────────────────────────────────────────────────────

/// What to do with a row whose Last Weight Zscore is not a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidScorePolicy {
    /// Skip the row and count it.
    #[default]
    Drop,
    /// Reject the whole file.
    Fail,
}

impl FromStr for InvalidScorePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(InvalidScorePolicy::Drop),
            "fail" => Ok(InvalidScorePolicy::Fail),
            other => Err(AppError::Config(format!(
                "unknown invalid-score policy {:?} (expected \"drop\" or \"fail\")",
                other
            ))),
        }
    }
}

/// How a successful upload is returned to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// JSON manifest listing the generated files.
    #[default]
    Manifest,
    /// The workbook itself, or a ZIP when several files were uploaded.
    Download,
}

impl FromStr for DeliveryMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manifest" => Ok(DeliveryMode::Manifest),
            "download" => Ok(DeliveryMode::Download),
            other => Err(AppError::Config(format!(
                "unknown delivery mode {:?} (expected \"manifest\" or \"download\")",
                other
            ))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ServiceConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Runtime configuration for the upload service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
    /// Directory that receives generated workbooks and archives.
    pub working_dir: PathBuf,
    /// Handling of non-numeric partitioning values.
    pub on_invalid_score: InvalidScorePolicy,
    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
    /// Delivery mode used when the request does not choose one.
    pub default_delivery: DeliveryMode,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            working_dir: PathBuf::from(DEFAULT_WORKING_DIR),
            on_invalid_score: InvalidScorePolicy::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            default_delivery: DeliveryMode::default(),
        }
    }
}

impl ServiceConfig {
    /// Builds the configuration from process environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Unset keys keep their defaults; set but malformed keys are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_BIND) {
            config.bind_addr = raw.trim().parse().map_err(|e| {
                AppError::Config(format!("{} must be host:port, got {:?}: {}", ENV_BIND, raw, e))
            })?;
        }
        if let Some(raw) = lookup(ENV_WORKING_DIR) {
            if raw.trim().is_empty() {
                return Err(AppError::Config(format!("{} must not be empty", ENV_WORKING_DIR)));
            }
            config.working_dir = PathBuf::from(raw.trim());
        }
        if let Some(raw) = lookup(ENV_ON_INVALID_SCORE) {
            config.on_invalid_score = raw.parse()?;
        }
        if let Some(raw) = lookup(ENV_MAX_UPLOAD_BYTES) {
            config.max_upload_bytes = raw.trim().parse().map_err(|e| {
                AppError::Config(format!(
                    "{} must be a byte count, got {:?}: {}",
                    ENV_MAX_UPLOAD_BYTES, raw, e
                ))
            })?;
        }
        if let Some(raw) = lookup(ENV_DELIVERY) {
            config.default_delivery = raw.parse()?;
        }

        Ok(config)
    }

    /// Sets the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Sets the invalid-score policy.
    pub fn on_invalid_score(mut self, policy: InvalidScorePolicy) -> Self {
        self.on_invalid_score = policy;
        self
    }

    /// Sets the request body limit.
    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Sets the default delivery mode.
    pub fn default_delivery(mut self, mode: DeliveryMode) -> Self {
        self.default_delivery = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ServiceConfig::from_lookup(|_| None).expect("defaults");
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.working_dir, PathBuf::from(DEFAULT_WORKING_DIR));
        assert_eq!(config.on_invalid_score, InvalidScorePolicy::Drop);
        assert_eq!(config.default_delivery, DeliveryMode::Manifest);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn overrides_are_applied() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            (ENV_BIND, "127.0.0.1:9001"),
            (ENV_WORKING_DIR, "/tmp/out"),
            (ENV_ON_INVALID_SCORE, "FAIL"),
            (ENV_MAX_UPLOAD_BYTES, "1024"),
            (ENV_DELIVERY, "download"),
        ]))
        .expect("config");

        assert_eq!(config.bind_addr.port(), 9001);
        assert_eq!(config.working_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.on_invalid_score, InvalidScorePolicy::Fail);
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.default_delivery, DeliveryMode::Download);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let cases = [
            (ENV_BIND, "not-an-address"),
            (ENV_ON_INVALID_SCORE, "ignore"),
            (ENV_MAX_UPLOAD_BYTES, "lots"),
            (ENV_DELIVERY, "email"),
            (ENV_WORKING_DIR, "  "),
        ];
        for (key, value) in cases {
            let result = ServiceConfig::from_lookup(lookup_from(&[(key, value)]));
            assert!(
                matches!(result, Err(AppError::Config(_))),
                "{}={} should be rejected",
                key,
                value
            );
        }
    }

    #[test]
    fn delivery_mode_deserializes_lowercase() {
        let mode: DeliveryMode = serde_json::from_str("\"download\"").expect("deserialize");
        assert_eq!(mode, DeliveryMode::Download);
    }
}
