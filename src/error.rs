//! Error types for phone-record ingestion and analysis
//!
//! Only failures that prevent a file from being read at all live here. A
//! table whose columns cannot be mapped is reported through
//! [`crate::mapping::MappingError`] and becomes a failed file outcome.
//! Row-level problems (unparseable timestamps, unknown directions) are not
//! errors: they are collected as [`crate::record::RowIssue`]s and the row is
//! skipped.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the phonestat library
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("No worksheet named {0:?}")]
    MissingSheet(String),

    #[error("Spreadsheet has no header row: {0}")]
    EmptySheet(PathBuf),

    #[error("Unsupported file extension {extension:?} for {path}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an I/O error together with the path that produced it
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<calamine::Error> for Error {
    fn from(err: calamine::Error) -> Self {
        Error::Spreadsheet(err.to_string())
    }
}

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mentions_path() {
        let err = Error::io(
            "/tmp/missing.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.csv"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn test_unsupported_format_display() {
        let err = Error::UnsupportedFormat {
            path: PathBuf::from("records.pdf"),
            extension: "pdf".to_string(),
        };
        assert!(err.to_string().contains("\"pdf\""));
    }
}
