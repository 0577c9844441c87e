//! Error types for dsvstream

use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, DsvError>;

/// Errors produced by dsvstream
///
/// Malformed input never produces an error: unbalanced quotes and ragged
/// rows degrade into best-effort rows. Errors only come from configuration
/// and from the file-backed reader/writer.
#[derive(Debug, Error)]
pub enum DsvError {
    /// Delimiter/enclosing combination that cannot be parsed unambiguously
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Failure while reading input
    #[error("Read error: {0}")]
    ReadError(String),

    /// Failure while writing output
    #[error("Write error: {0}")]
    WriteError(String),

    /// Raw I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
