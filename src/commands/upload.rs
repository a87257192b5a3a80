//! Upload processing.
//!
//! Every uploaded file runs through ingest → partition → render and is then
//! written to the working directory. Files are handled one after another in
//! submission order; the request succeeds only if all of them do.

use std::path::PathBuf;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::DeliveryMode;
use crate::delivery::{
    archive_file_name, bundle_archive, document_file_name, download_name, sanitize_display_name,
    write_document, ArtifactSet, DEFAULT_UPLOAD_NAME, ZIP_CONTENT_TYPE,
};
use crate::error::AppError;
use crate::pipeline::{build_document, BucketCounts, UploadedFile};
use crate::render::XLSX_CONTENT_TYPE;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Multipart field that carries uploads.
pub const UPLOAD_FIELD: &str = "files";

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

/// Query parameters of `POST /upload`.
#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    /// Overrides the configured delivery mode.
    pub delivery: Option<DeliveryMode>,
}

/// Result for one uploaded file.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedFile {
    /// Sanitized caller filename.
    pub original_filename: String,
    /// Where the workbook was written.
    pub output_path: String,
    /// Suggested name when saving the workbook.
    pub download_name: String,
    pub total_rows: usize,
    pub skipped_rows: usize,
    #[serde(flatten)]
    pub counts: BucketCounts,
    #[serde(skip)]
    pub path: PathBuf,
}

/// Everything a successful batch produced.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub files: Vec<ProcessedFile>,
    /// Present when more than one file was processed.
    pub archive: Option<PathBuf>,
}

/// JSON body of a manifest-mode response.
#[derive(Debug, Clone, Serialize)]
pub struct UploadManifest {
    pub processed_files: Vec<ProcessedFile>,
    pub archive: Option<String>,
}

impl From<BatchOutcome> for UploadManifest {
    fn from(outcome: BatchOutcome) -> Self {
        Self {
            processed_files: outcome.files,
            archive: outcome.archive.map(|p| p.display().to_string()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handler
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /upload`: process a multipart batch of CSV files.
///
/// Extractor rejections are reported through `AppError` so every failure
/// carries the same JSON body.
pub async fn upload_files(
    State(state): State<AppState>,
    params: Result<Query<UploadParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let Query(params) = params.map_err(|e| AppError::InvalidUpload(e.body_text()))?;
    let multipart = multipart.map_err(|e| AppError::InvalidUpload(e.body_text()))?;
    let files = read_uploads(multipart).await?;
    let mode = params.delivery.unwrap_or(state.config.default_delivery);

    info!("[HTTP] Upload of {} file(s), delivery {:?}", files.len(), mode);
    let outcome = process_batch(&state, files).await?;

    match mode {
        DeliveryMode::Manifest => Ok(Json(UploadManifest::from(outcome)).into_response()),
        DeliveryMode::Download => download_response(&outcome).await,
    }
}

/// Collects every `files` part of the request, in order.
async fn read_uploads(mut multipart: Multipart) -> Result<Vec<UploadedFile>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::UploadTooLarge
        } else {
            AppError::InvalidUpload(e.body_text())
        }
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            debug!("[HTTP] Ignoring multipart field {:?}", field.name());
            continue;
        }

        let filename = field.file_name().unwrap_or(DEFAULT_UPLOAD_NAME).to_string();
        let bytes = field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::UploadTooLarge
            } else {
                AppError::InvalidUpload(e.body_text())
            }
        })?;
        files.push(UploadedFile::new(filename, bytes.to_vec()));
    }

    Ok(files)
}

async fn download_response(outcome: &BatchOutcome) -> Result<Response, AppError> {
    let (path, content_type, name) = match (&outcome.archive, outcome.files.as_slice()) {
        (Some(archive), _) => (
            archive.clone(),
            ZIP_CONTENT_TYPE,
            archive
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        ),
        (None, [single]) => (single.path.clone(), XLSX_CONTENT_TYPE, single.download_name.clone()),
        (None, _) => return Err(AppError::Internal("batch produced no artifact".into())),
    };

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::Delivery(format!("Failed to read {}: {}", path.display(), e)))?;

    let headers = [
        (header::CONTENT_TYPE, content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", name),
        ),
    ];
    Ok((headers, bytes).into_response())
}

// ─────────────────────────────────────────────────────────────────────────────
// Batch processing
// ─────────────────────────────────────────────────────────────────────────────

/// Processes uploads in order and packages the results.
///
/// All files written here are removed again if any step fails, so an error
/// response never leaves partial output in the working directory.
///
/// # Errors
///
/// - `AppError::NoFiles` if `files` is empty
/// - the first per-file error, naming the offending file
/// - `AppError::Delivery` if writing or archiving fails
pub async fn process_batch(
    state: &AppState,
    files: Vec<UploadedFile>,
) -> Result<BatchOutcome, AppError> {
    if files.is_empty() {
        return Err(AppError::NoFiles);
    }

    let working_dir = state.config.working_dir.clone();
    let policy = state.config.on_invalid_score;
    let mut artifacts = ArtifactSet::new();
    let mut processed = Vec::with_capacity(files.len());

    for file in files {
        let display_name = sanitize_display_name(&file.filename);
        let target = working_dir.join(document_file_name(&state.namer.next_token()));

        // The blocking task only renders. Files are written and tracked on
        // the request task.
        let task_name = display_name.clone();
        let document = tokio::task::spawn_blocking(move || {
            build_document(&task_name, &file.bytes, policy)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))??;

        let path = write_document(&target, &document.bytes)?;
        artifacts.track(path.clone());
        info!("[DELIVERY] {} -> {}", display_name, path.display());

        processed.push(ProcessedFile {
            download_name: download_name(&display_name),
            original_filename: display_name,
            output_path: path.display().to_string(),
            total_rows: document.stats.total_rows,
            skipped_rows: document.stats.skipped_rows,
            counts: document.counts,
            path,
        });
    }

    let archive = if processed.len() > 1 {
        let target = working_dir.join(archive_file_name(&state.namer.next_token()));
        let documents: Vec<PathBuf> = processed.iter().map(|f| f.path.clone()).collect();
        let path = bundle_archive(&target, &documents)?;
        artifacts.track(path.clone());
        Some(path)
    } else {
        None
    };

    artifacts.commit();

    Ok(BatchOutcome {
        files: processed,
        archive,
    })
}
