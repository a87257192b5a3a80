//! Output naming and per-request artifact tracking.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};
use uuid::Uuid;

/// Display name used when an upload carries no usable filename.
pub const DEFAULT_UPLOAD_NAME: &str = "upload.csv";

// ─────────────────────────────────────────────────────────────────────────────
// Naming
// ─────────────────────────────────────────────────────────────────────────────

/// Source of unique tokens for on-disk file names.
pub trait ArtifactNamer: Send + Sync {
    /// Returns a token never returned before by this namer.
    fn next_token(&self) -> String;
}

/// Random UUID tokens. Used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidNamer;

impl ArtifactNamer for UuidNamer {
    fn next_token(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Deterministic `<seed>-<n>` tokens for reproducible runs.
#[derive(Debug)]
pub struct SequentialNamer {
    seed: String,
    counter: AtomicU64,
}

impl SequentialNamer {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl ArtifactNamer for SequentialNamer {
    fn next_token(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}-{:04}", self.seed, n)
    }
}

/// On-disk name of a rendered workbook.
pub fn document_file_name(token: &str) -> String {
    format!("processed_{}.xlsx", token)
}

/// On-disk name of a batch archive.
pub fn archive_file_name(token: &str) -> String {
    format!("processed_{}.zip", token)
}

/// Reduces a caller-supplied filename to a safe display name.
///
/// Directory components are dropped and anything outside
/// `[A-Za-z0-9._ -]` becomes `_`, so the result is safe both as a header
/// value and as a single path segment.
pub fn sanitize_display_name(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == ' ');

    if cleaned.is_empty() {
        DEFAULT_UPLOAD_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Suggested download name for the workbook built from `display_name`.
pub fn download_name(display_name: &str) -> String {
    let stem = Path::new(display_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(display_name);
    format!("processed_{}.xlsx", stem)
}

// ─────────────────────────────────────────────────────────────────────────────
// ArtifactSet
// ─────────────────────────────────────────────────────────────────────────────

/// Files created while serving one request.
///
/// Unless [`ArtifactSet::commit`] is called, every tracked file is deleted
/// when the set is dropped, so error paths and cancelled requests leave the
/// working directory as they found it.
#[derive(Debug, Default)]
pub struct ArtifactSet {
    paths: Vec<PathBuf>,
    committed: bool,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Keeps every tracked file and returns their paths.
    pub fn commit(mut self) -> Vec<PathBuf> {
        self.committed = true;
        std::mem::take(&mut self.paths)
    }
}

impl Drop for ArtifactSet {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => debug!("[DELIVERY] Rolled back {}", path.display()),
                Err(e) => warn!("[DELIVERY] Failed to roll back {}: {}", path.display(), e),
            }
        }
    }
}
