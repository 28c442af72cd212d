//! Error types for daybook-parser

use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid date at row {row}: {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { row: usize, value: String },

    #[error("Invalid {field} amount at row {row}: {value:?}")]
    InvalidAmount {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("Row {row} has {found} fields, expected {expected}")]
    FieldCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Unsupported file (not a CSV): {path}")]
    UnsupportedFile { path: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cannot read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl ParseError {
    /// Row number the error refers to, when it is row-specific
    pub fn row(&self) -> Option<usize> {
        match self {
            ParseError::InvalidDate { row, .. }
            | ParseError::InvalidAmount { row, .. }
            | ParseError::FieldCount { row, .. } => Some(*row),
            _ => None,
        }
    }
}
