//! Error types for report generation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Errors that can occur while writing a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Invalid report path: {0}")]
    InvalidPath(PathBuf),

    #[error("Failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
