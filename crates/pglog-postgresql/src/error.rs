//! Error types for the PostgreSQL log streams.

use postgresql_log_types::{CodecError, ColumnMappingError, RowError};
use thiserror::Error;

/// Errors that can occur while setting up or running a log stream.
#[derive(Error, Debug)]
pub enum LogStreamError {
    /// PostgreSQL connection or query error.
    #[error("PostgreSQL error: {0}")]
    PostgreSQL(#[from] tokio_postgres::Error),

    /// Stream parameters are incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Statement generation failed; the stream cannot be set up.
    #[error("Setup error: {0}")]
    Setup(#[from] CodecError),

    /// A field has no column in the query result.
    #[error("Column mapping error: {0}")]
    ColumnMapping(#[from] ColumnMappingError),

    /// A row could not be encoded.
    #[error("Row error: {0}")]
    Row(#[from] RowError),
}

pub type Result<T> = std::result::Result<T, LogStreamError>;
