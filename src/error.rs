use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while aggregating a BPY331 payment file
///
/// Everything up to and including the write is all-or-nothing: any of these
/// aborts the file before the destination is touched, except `Notification`,
/// which the pipeline only logs.
#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("no eligible payment file found in {location}")]
    NoInputFound { location: PathBuf },

    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("invalid {field} '{value}' in record at line {line}")]
    InvalidBankDetails {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("identity store error: {0}")]
    IdentityStore(#[from] rusqlite::Error),

    #[error("value '{value}' does not fit field {field} (width {width})")]
    FieldOverflow {
        field: &'static str,
        value: String,
        width: usize,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("notification failed: {0}")]
    Notification(String),
}

impl AggregateError {
    pub(crate) fn parse(line: usize, reason: impl Into<String>) -> Self {
        AggregateError::Parse {
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AggregateError>;
