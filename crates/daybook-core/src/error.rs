//! Error types for daybook-core
//!
//! This module provides error handling for ingest, storage and statement
//! generation, including error codes, detailed messages, and suggestions.

use daybook_config::ConfigError;
use daybook_parser::ParseError as RecordParseError;
use thiserror::Error;
use serde::{Deserialize, Serialize};
use std::io;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed input row
    ParseError,
    /// Duplicate content identity
    Conflict,
    /// Storage cannot be opened or written
    StoreUnavailable,
    /// Transaction not found
    TransactionNotFound,
    /// Input file format not supported
    InvalidFormat,
    /// Configuration error
    ConfigError,
    /// IO error
    IoError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::ParseError => write!(f, "PARSE_ERROR"),
            ErrorCode::Conflict => write!(f, "CONFLICT"),
            ErrorCode::StoreUnavailable => write!(f, "STORE_UNAVAILABLE"),
            ErrorCode::TransactionNotFound => write!(f, "TRANSACTION_NOT_FOUND"),
            ErrorCode::InvalidFormat => write!(f, "INVALID_FORMAT"),
            ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
        }
    }
}

/// Detailed error information for reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - operation rejected, data unchanged
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - storage or configuration is unusable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for daybook-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Parse error: {message}")]
    ParseError { message: String, row: Option<usize> },

    #[error("Duplicate transaction: {id}")]
    Conflict { id: String },

    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Transaction not found: {id}")]
    TransactionNotFound { id: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {message}")]
    IoError { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::ParseError { .. } => ErrorCode::ParseError,
            CoreError::Conflict { .. } => ErrorCode::Conflict,
            CoreError::StoreUnavailable { .. } => ErrorCode::StoreUnavailable,
            CoreError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            CoreError::ConfigError { .. } => ErrorCode::ConfigError,
            CoreError::IoError { .. } => ErrorCode::IoError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::ParseError { .. } => ErrorSeverity::Error,
            CoreError::Conflict { .. } => ErrorSeverity::Warning,
            CoreError::StoreUnavailable { .. } => ErrorSeverity::Critical,
            CoreError::TransactionNotFound { .. } => ErrorSeverity::Info,
            CoreError::InvalidFormat { .. } => ErrorSeverity::Error,
            CoreError::ConfigError { .. } => ErrorSeverity::Critical,
            CoreError::IoError { .. } => ErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::ParseError { row, .. } => {
                if let Some(row) = row {
                    details = details.with_detail(serde_json::json!({ "row": row }));
                }
                details = details.with_suggestion(
                    "Rows must be: date (YYYY-MM-DD), description, debit, credit.".to_string()
                );
                details = details.with_suggestion(
                    "Amounts are non-negative decimals or left blank.".to_string()
                );
            }
            CoreError::Conflict { id } => {
                details = details.with_detail(serde_json::json!({ "unique_id": id }));
                details = details.with_suggestion(
                    "The batch was rejected and nothing was stored.".to_string()
                );
                details = details.with_suggestion(
                    "Re-run the import with --skip-duplicates to store only new rows.".to_string()
                );
            }
            CoreError::StoreUnavailable { .. } => {
                details = details.with_suggestion(
                    "Check that the data directory exists and is writable.".to_string()
                );
            }
            CoreError::TransactionNotFound { .. } => {
                details = details.with_suggestion(
                    "Check if the transaction ID is correct.".to_string()
                );
            }
            CoreError::InvalidFormat { .. } => {
                details = details.with_suggestion(
                    "Only .csv files can be imported.".to_string()
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<io::Error> for CoreError {
    fn from(error: io::Error) -> Self {
        CoreError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<RecordParseError> for CoreError {
    fn from(error: RecordParseError) -> Self {
        match error {
            RecordParseError::UnsupportedFile { .. } => CoreError::InvalidFormat {
                message: error.to_string(),
            },
            RecordParseError::ReadFailed { .. } | RecordParseError::IoError(_) => {
                CoreError::IoError {
                    message: error.to_string(),
                }
            }
            other => CoreError::ParseError {
                row: other.row(),
                message: other.to_string(),
            },
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(error: rusqlite::Error) -> Self {
        CoreError::StoreUnavailable {
            message: error.to_string(),
        }
    }
}

impl From<ConfigError> for CoreError {
    fn from(error: ConfigError) -> Self {
        CoreError::ConfigError {
            message: error.to_string(),
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            data: serde_json::json!({}),
        }
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Info | ErrorSeverity::Warning => log::warn!(
                target: "daybook::error",
                "{} - Operation: {} - Context: {}",
                error.to_details(),
                context.operation,
                context.data
            ),
            ErrorSeverity::Error | ErrorSeverity::Critical => log::error!(
                target: "daybook::error",
                "{} - Operation: {} - Context: {}",
                error.to_details(),
                context.operation,
                context.data
            ),
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "daybook::error",
            "WARNING: {} - Operation: {}",
            message,
            context.operation
        );
    }
}

// ==================== Tests ====================
