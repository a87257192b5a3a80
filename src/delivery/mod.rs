//! Packaging of rendered workbooks for download.
//!
//! Documents land in the working directory under opaque generated names,
//! written atomically. Multi-file requests are bundled into one ZIP archive.
//! Everything a request creates is tracked so a failed request leaves no
//! files behind.

mod archive;
mod artifacts;
mod atomic_writer;

pub use archive::{bundle_archive, ZIP_CONTENT_TYPE};
pub use artifacts::{
    archive_file_name, document_file_name, download_name, sanitize_display_name, ArtifactNamer,
    ArtifactSet, SequentialNamer, UuidNamer, DEFAULT_UPLOAD_NAME,
};
pub use atomic_writer::{write_document, AtomicFileWriter};
