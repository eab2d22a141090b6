//! Domain error types
//!
//! This module defines the error hierarchy for drain. Errors are
//! domain-specific and don't expose AWS SDK types. Throttling is a
//! distinguished variant so the backoff policy can tell retryable rejections
//! apart from fatal API failures.

use thiserror::Error;

/// Main drain error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum DrainError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// User directory errors
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Deduplication errors
    #[error("Deduplication error: {0}")]
    Dedup(#[from] DedupError),

    /// Export process errors
    #[error("Export error: {0}")]
    Export(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Checkpoint persistence errors
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// S3 upload errors
    #[error("Upload error: {0}")]
    Upload(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// User-directory-specific errors
///
/// Errors surfaced by the directory listing backend. These don't expose
/// the underlying SDK error types.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Rate-limit rejection from the directory service. The only retryable
    /// error kind.
    #[error("Throttled by directory service ({code}): {message}")]
    Throttled { code: String, message: String },

    /// A throttled call that stayed throttled through every retry attempt
    #[error("Retries exhausted after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// User pool does not exist or is not visible to the caller
    #[error("User pool not found: {0}")]
    PoolNotFound(String),

    /// Credentials rejected or missing permissions
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Any other service error
    #[error("Directory API error ({code}): {message}")]
    Api { code: String, message: String },

    /// Request never reached the service
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

impl DirectoryError {
    /// True for errors the backoff policy may retry.
    pub fn is_throttling(&self) -> bool {
        matches!(self, DirectoryError::Throttled { .. })
    }
}

/// Deduplication-specific errors
///
/// Rows that cannot form a key are a hard error (fail-fast), reported with
/// enough context to fix the invocation or the input file.
#[derive(Debug, Error)]
pub enum DedupError {
    /// Input file does not exist
    #[error("Input file does not exist: {0}")]
    InputNotFound(String),

    /// Input file is empty or has no header row
    #[error("CSV file is empty or has no header row")]
    EmptyInput,

    /// Configured key columns are absent from the CSV header
    #[error("Key columns not found in CSV header: {missing:?} (available: {available:?})")]
    MissingKeyColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },

    /// A data row that does not match the header layout
    #[error("Malformed CSV row {row}: {message}")]
    MalformedRow { row: u64, message: String },

    /// Output path would clobber the input file
    #[error("Output path must differ from the input path: {0}")]
    OutputCollidesWithInput(String),

    /// I/O errors reading or writing CSV files
    #[error("I/O error: {0}")]
    Io(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for DrainError {
    fn from(err: std::io::Error) -> Self {
        DrainError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for DrainError {
    fn from(err: serde_json::Error) -> Self {
        DrainError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for DrainError {
    fn from(err: toml::de::Error) -> Self {
        DrainError::Configuration(format!("TOML parse error: {err}"))
    }
}
