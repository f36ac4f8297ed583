//! Error types for tabledef

use thiserror::Error;

/// Core error type for tabledef operations
#[derive(Error, Debug)]
pub enum TableDefError {
    /// The input is not a `CREATE TABLE` statement in `SHOW CREATE TABLE` form
    #[error("Malformed statement: {0}")]
    MalformedStatement(String),

    /// A value expected to be a quoted identifier or string literal was not quoted
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for tabledef operations
pub type Result<T> = std::result::Result<T, TableDefError>;
