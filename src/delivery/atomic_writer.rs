//! Atomic file writer with automatic cleanup on failure.
//!
//! Writes to a temporary file in the same directory as the destination, then
//! moves it into place on `finish()` without ever replacing an existing file.
//! If dropped before finishing, the temporary file is removed.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::AppError;

/// A write-once file that only becomes visible when complete.
pub struct AtomicFileWriter {
    file: NamedTempFile,
    final_path: PathBuf,
}

impl AtomicFileWriter {
    /// Creates a writer targeting `final_path`.
    ///
    /// The temporary file is created next to `final_path` so the final move
    /// stays on one filesystem.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Delivery` if the parent directory cannot be
    /// determined or the temporary file cannot be created.
    pub fn new(final_path: impl AsRef<Path>) -> Result<Self, AppError> {
        let final_path = final_path.as_ref().to_path_buf();

        let parent_dir = final_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        if final_path.file_name().is_none() {
            return Err(AppError::Delivery(format!(
                "Cannot write to directory path: {}",
                final_path.display()
            )));
        }

        let file = NamedTempFile::new_in(parent_dir)
            .map_err(|e| AppError::Delivery(format!("Failed to create temporary file: {}", e)))?;

        Ok(Self { file, final_path })
    }

    /// The underlying temporary file.
    pub fn file_mut(&mut self) -> &mut File {
        self.file.as_file_mut()
    }

    /// Flushes and moves the file into place.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Delivery` if flushing fails or the destination
    /// already exists. The temporary file is removed in either case.
    pub fn finish(mut self) -> Result<PathBuf, AppError> {
        self.file
            .as_file_mut()
            .flush()
            .map_err(|e| AppError::Delivery(format!("Failed to flush file: {}", e)))?;

        self.file.persist_noclobber(&self.final_path).map_err(|e| {
            AppError::Delivery(format!(
                "Failed to persist file to {}: {}",
                self.final_path.display(),
                e.error
            ))
        })?;

        Ok(self.final_path)
    }
}

/// Writes `bytes` to `final_path` atomically.
pub fn write_document(final_path: &Path, bytes: &[u8]) -> Result<PathBuf, AppError> {
    let mut writer = AtomicFileWriter::new(final_path)?;
    writer
        .file_mut()
        .write_all(bytes)
        .map_err(|e| AppError::Delivery(format!("Failed to write {}: {}", final_path.display(), e)))?;
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> usize {
        fs::read_dir(dir).expect("read dir").count()
    }

    #[test]
    fn writes_document() {
        let temp_dir = TempDir::new().expect("temp dir");
        let final_path = temp_dir.path().join("processed_a.xlsx");

        let written = write_document(&final_path, b"PK\x03\x04data").expect("write");

        assert_eq!(written, final_path);
        assert_eq!(fs::read(&final_path).expect("read"), b"PK\x03\x04data");
        assert_eq!(entries(temp_dir.path()), 1);
    }

    #[test]
    fn drop_without_finish_leaves_nothing() {
        let temp_dir = TempDir::new().expect("temp dir");
        let final_path = temp_dir.path().join("processed_a.xlsx");

        {
            let mut writer = AtomicFileWriter::new(&final_path).expect("writer");
            writer.file_mut().write_all(b"partial").expect("write");
        }

        assert_eq!(entries(temp_dir.path()), 0);
        assert!(!final_path.exists());
    }

    #[test]
    fn existing_file_is_never_replaced() {
        let temp_dir = TempDir::new().expect("temp dir");
        let final_path = temp_dir.path().join("processed_a.xlsx");
        fs::write(&final_path, "FIRST").expect("seed");

        let result = write_document(&final_path, b"SECOND");

        assert!(matches!(result, Err(AppError::Delivery(_))));
        assert_eq!(fs::read_to_string(&final_path).expect("read"), "FIRST");
        assert_eq!(entries(temp_dir.path()), 1, "temporary file should be cleaned up");
    }

    #[test]
    fn missing_directory_is_a_delivery_error() {
        let temp_dir = TempDir::new().expect("temp dir");
        let final_path = temp_dir.path().join("nope").join("processed_a.xlsx");
        assert!(matches!(
            write_document(&final_path, b"x"),
            Err(AppError::Delivery(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn root_path_is_rejected() {
        assert!(AtomicFileWriter::new("/").is_err());
    }
}
