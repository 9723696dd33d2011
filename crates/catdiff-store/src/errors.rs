//! Error handling for catdiff-store
//!
//! Wraps catdiff-core ExError with store-specific helpers

use catdiff_core::errors::{ExError, ExErrorKind};
use std::path::Path;
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Failures while staging a zipped catalog
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Archive {path} is not a readable zip file: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Expected exactly one .lrcat in {dir}, found {found:?}")]
    CatalogCount { dir: String, found: Vec<String> },
}

impl From<ArchiveError> for ExError {
    fn from(err: ArchiveError) -> Self {
        let message = err.to_string();
        let entity = match &err {
            ArchiveError::Unreadable { path, .. } => path.clone(),
            ArchiveError::CatalogCount { dir, .. } => dir.clone(),
        };
        ExError::new(ExErrorKind::Archive)
            .with_op("stage_catalog")
            .with_entity_id(entity)
            .with_message(message)
    }
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    let kind = if err.kind() == std::io::ErrorKind::NotFound {
        ExErrorKind::NotFound
    } else {
        ExErrorKind::Io
    };
    ExError::new(kind)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an archive error from a zip failure
pub fn archive_error(path: &Path, err: zip::result::ZipError) -> ExError {
    ArchiveError::Unreadable {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
    .into()
}

/// Create a not-found error for a catalog path
pub fn catalog_not_found(path: &Path) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op("load_catalog")
        .with_entity_id(path.display().to_string())
        .with_message("catalog file does not exist")
}
