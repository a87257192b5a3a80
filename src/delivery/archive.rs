//! ZIP bundling of the workbooks produced by one request.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::atomic_writer::AtomicFileWriter;
use crate::error::AppError;

/// MIME type of batch archives.
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Bundles `documents` into a new archive at `final_path`.
///
/// Each document becomes one entry named after its base filename, in the
/// order given. The archive is written atomically.
///
/// # Errors
///
/// Returns `AppError::Delivery` if a document cannot be read or the archive
/// cannot be written.
pub fn bundle_archive(final_path: &Path, documents: &[PathBuf]) -> Result<PathBuf, AppError> {
    let mut writer = AtomicFileWriter::new(final_path)?;

    {
        let mut zip = ZipWriter::new(writer.file_mut());
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for document in documents {
            let entry_name = document
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    AppError::Delivery(format!("Document has no file name: {}", document.display()))
                })?;

            zip.start_file(entry_name, options)
                .map_err(|e| AppError::Delivery(format!("Failed to add {}: {}", entry_name, e)))?;

            let mut source = File::open(document).map_err(|e| {
                AppError::Delivery(format!("Failed to open {}: {}", document.display(), e))
            })?;
            std::io::copy(&mut source, &mut zip).map_err(|e| {
                AppError::Delivery(format!("Failed to archive {}: {}", document.display(), e))
            })?;
        }

        zip.finish()
            .map_err(|e| AppError::Delivery(format!("Failed to finish archive: {}", e)))?;
    }

    let path = writer.finish()?;
    info!(
        "[DELIVERY] Bundled {} documents into {}",
        documents.len(),
        path.display()
    );
    Ok(path)
}
