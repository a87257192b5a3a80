//! Severity partitioning by Last Weight Zscore.
//!
//! | Bucket | Range            |
//! |--------|------------------|
//! | SUW    | `z <= -3`        |
//! | MUW    | `-3 < z <= -2`   |
//! | Mild   | `-2 < z <= -1`   |
//!
//! Rows above -1 belong to no bucket and are only counted.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::InvalidScorePolicy;
use crate::error::AppError;
use crate::ingest::{RecordTable, SCORE_COLUMN};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Upper bound (inclusive) of the SUW bucket.
pub const SUW_MAX: f64 = -3.0;

/// Upper bound (inclusive) of the MUW bucket.
pub const MUW_MAX: f64 = -2.0;

/// Upper bound (inclusive) of the Mild bucket.
pub const MILD_MAX: f64 = -1.0;

// ─────────────────────────────────────────────────────────────────────────────
// Bucket
// ─────────────────────────────────────────────────────────────────────────────

/// Severity bucket, in output sheet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Bucket {
    /// Severe underweight.
    Suw,
    /// Moderate underweight.
    Muw,
    /// Mild underweight.
    Mild,
}

impl Bucket {
    /// All buckets in sheet order.
    pub const ALL: [Bucket; 3] = [Bucket::Suw, Bucket::Muw, Bucket::Mild];

    /// Worksheet name for this bucket.
    pub fn sheet_name(self) -> &'static str {
        match self {
            Bucket::Suw => "SUW",
            Bucket::Muw => "MUW",
            Bucket::Mild => "Mild",
        }
    }

    /// Structured table name for this bucket's sheet. Unique per workbook.
    pub fn table_name(self) -> &'static str {
        match self {
            Bucket::Suw => "Table_SUW",
            Bucket::Muw => "Table_MUW",
            Bucket::Mild => "Table_Mild",
        }
    }

    /// Returns the bucket for a score, or `None` if the row is not underweight.
    pub fn classify(score: f64) -> Option<Bucket> {
        if score <= SUW_MAX {
            Some(Bucket::Suw)
        } else if score <= MUW_MAX {
            Some(Bucket::Muw)
        } else if score <= MILD_MAX {
            Some(Bucket::Mild)
        } else {
            None
        }
    }
}

/// A parsed partitioning cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    Blank,
    Invalid,
    Value(f64),
}

impl Score {
    pub fn parse(raw: &str) -> Score {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Score::Blank;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Score::Value(v),
            _ => Score::Invalid,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Partitioned
// ─────────────────────────────────────────────────────────────────────────────

/// The three bucket tables plus counts of rows that landed in none of them.
#[derive(Debug, Clone)]
pub struct Partitioned {
    suw: RecordTable,
    muw: RecordTable,
    mild: RecordTable,
    /// Rows with a valid score above -1.
    pub excluded_rows: usize,
    /// Rows with an empty score cell.
    pub blank_scores: usize,
    /// Rows with a non-numeric score, dropped under [`InvalidScorePolicy::Drop`].
    pub invalid_scores: usize,
}

impl Partitioned {
    pub fn bucket(&self, bucket: Bucket) -> &RecordTable {
        match bucket {
            Bucket::Suw => &self.suw,
            Bucket::Muw => &self.muw,
            Bucket::Mild => &self.mild,
        }
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut RecordTable {
        match bucket {
            Bucket::Suw => &mut self.suw,
            Bucket::Muw => &mut self.muw,
            Bucket::Mild => &mut self.mild,
        }
    }

    /// Number of rows placed in any bucket.
    pub fn bucketed_rows(&self) -> usize {
        Bucket::ALL.iter().map(|&b| self.bucket(b).len()).sum()
    }
}

/// Splits a projected table into severity buckets.
///
/// Order inside each bucket follows the input table.
///
/// # Errors
///
/// - `AppError::InvalidScore` for a non-numeric score under
///   [`InvalidScorePolicy::Fail`]
/// - `AppError::Internal` if the table lacks the score column
pub fn partition(
    filename: &str,
    table: &RecordTable,
    policy: InvalidScorePolicy,
) -> Result<Partitioned, AppError> {
    let score_idx = table.column_index(SCORE_COLUMN).ok_or_else(|| {
        AppError::Internal(format!("{} reached partitioning without {}", filename, SCORE_COLUMN))
    })?;

    let mut result = Partitioned {
        suw: table.empty_like(),
        muw: table.empty_like(),
        mild: table.empty_like(),
        excluded_rows: 0,
        blank_scores: 0,
        invalid_scores: 0,
    };

    for row in table.rows() {
        match Score::parse(row.get(score_idx)) {
            Score::Value(v) => match Bucket::classify(v) {
                Some(bucket) => result.bucket_mut(bucket).push(row.clone()),
                None => result.excluded_rows += 1,
            },
            Score::Blank => result.blank_scores += 1,
            Score::Invalid => match policy {
                InvalidScorePolicy::Drop => {
                    result.invalid_scores += 1;
                    warn!(
                        "[PARTITION] {}: dropping line {} with score {:?}",
                        filename,
                        row.line,
                        row.get(score_idx)
                    );
                }
                InvalidScorePolicy::Fail => {
                    return Err(AppError::InvalidScore {
                        filename: filename.to_string(),
                        line: row.line,
                        value: row.get(score_idx).to_string(),
                    });
                }
            },
        }
    }

    info!(
        "[PARTITION] {}: SUW={} MUW={} Mild={} excluded={} blank={} invalid={}",
        filename,
        result.suw.len(),
        result.muw.len(),
        result.mild.len(),
        result.excluded_rows,
        result.blank_scores,
        result.invalid_scores
    );

    Ok(result)
}
