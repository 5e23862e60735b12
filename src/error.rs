//! Error handling for star-schema ETL operations.
//!
//! Row-level problems (malformed records, unmatched joins) are absorbed and
//! counted by the transform layer; the variants here cover location-level
//! failures that abort a run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Directory traversal error: {0}")]
    DirectoryTraversal(#[from] walkdir::Error),

    #[error("Source path does not exist: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Source path yielded no JSON files: {path}")]
    EmptyInput { path: PathBuf },

    #[error(
        "Malformed-record drop rate exceeded: {dropped} of {scanned} filtered events dropped (max rate {max_drop_rate})"
    )]
    MalformedThresholdExceeded {
        dropped: usize,
        scanned: usize,
        max_drop_rate: f64,
    },

    #[error("Processing failed for {path}: {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },

    #[error("Failed to write table '{table}': {reason}")]
    WriteFailed { table: String, reason: String },

    #[error("Failed to publish output at {path}: {reason}")]
    PublishFailed { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Run interrupted: {reason}")]
    Interrupted { reason: String },
}

pub type Result<T> = std::result::Result<T, EtlError>;
