//! The per-file transformation: CSV bytes in, XLSX bytes out.

use serde::Serialize;

use crate::config::InvalidScorePolicy;
use crate::error::AppError;
use crate::ingest::{parse_table, IngestStats};
use crate::partition::{partition, Bucket, Partitioned};
use crate::render::render_workbook;

/// A named upload as received from the caller.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Caller-supplied name. Untrusted; never used as a path.
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Row counts per bucket plus rows that reached no bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub suw_rows: usize,
    pub muw_rows: usize,
    pub mild_rows: usize,
    pub excluded_rows: usize,
    pub blank_scores: usize,
    pub invalid_scores: usize,
}

impl From<&Partitioned> for BucketCounts {
    fn from(parts: &Partitioned) -> Self {
        Self {
            suw_rows: parts.bucket(Bucket::Suw).len(),
            muw_rows: parts.bucket(Bucket::Muw).len(),
            mild_rows: parts.bucket(Bucket::Mild).len(),
            excluded_rows: parts.excluded_rows,
            blank_scores: parts.blank_scores,
            invalid_scores: parts.invalid_scores,
        }
    }
}

/// A finished workbook for one upload, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub stats: IngestStats,
    pub counts: BucketCounts,
}

/// Runs ingestion, partitioning and rendering for one upload.
///
/// `display_name` is the sanitized upload name used in logs and errors.
/// CPU-bound; call from a blocking context.
pub fn build_document(
    display_name: &str,
    bytes: &[u8],
    policy: InvalidScorePolicy,
) -> Result<RenderedDocument, AppError> {
    let ingested = parse_table(display_name, bytes)?;
    let parts = partition(display_name, &ingested.table, policy)?;
    let bytes = render_workbook(display_name, &parts)?;

    Ok(RenderedDocument {
        bytes,
        stats: ingested.stats,
        counts: BucketCounts::from(&parts),
    })
}
