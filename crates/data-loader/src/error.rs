//! Error types for the data-loader crate.
//!
//! Loading happens once at process start, so every variant carries enough
//! context (file, line, column) to fix the offending input by hand.

use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading the catalog and the embedding index
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File does not exist
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// File exists but could not be opened (permissions, a directory, ...)
    #[error("I/O error on {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected the catalog file (bad quoting, ragged rows)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The embedding index file is not valid JSON for the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A catalog row couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// The header row lacks a column the catalog cannot do without
    #[error("Missing required column '{column}' in {file}")]
    MissingColumn { file: String, column: String },

    /// Referenced entity doesn't exist (e.g., embedding for a non-existent item)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: u32 },

    /// A vector's length disagrees with the index dimension
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, DataLoadError>;

/// Open `path`, telling a missing file apart from other I/O failures
pub(crate) fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| {
        let path = path.display().to_string();
        match source.kind() {
            io::ErrorKind::NotFound => DataLoadError::FileNotFound { path },
            _ => DataLoadError::IoError { path, source },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_file_not_found() {
        let err = open_file(Path::new("/nonexistent/movies.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { ref path } if path == "/nonexistent/movies.csv"));
    }

    #[test]
    fn test_file_used_as_directory_is_io_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = open_file(&file.path().join("movies.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::IoError { .. }));
    }
}
