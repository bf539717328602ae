//! Error types for the PostgreSQL log codec.

use log_core::LogType;
use thiserror::Error;

/// Errors produced while mapping, encoding or decoding values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// The type has no PostgreSQL column mapping.
    #[error("unsupported field format {0}")]
    UnsupportedKind(LogType),

    /// An identifier could not be quoted.
    #[error("error while escaping identifier '{identifier}': {reason}")]
    EscapeFailure { identifier: String, reason: String },

    /// Text does not conform to the grammar of its declared type.
    #[error("malformed {kind} value '{text}': {reason}")]
    Malformed {
        kind: LogType,
        text: String,
        reason: String,
    },

    /// A payload does not match its declared type.
    #[error("value of type {expected} carries a {found} payload")]
    TypeMismatch {
        expected: LogType,
        found: &'static str,
    },
}

impl CodecError {
    pub(crate) fn malformed(kind: &LogType, text: &str, reason: impl ToString) -> Self {
        Self::Malformed {
            kind: kind.clone(),
            text: text.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Errors scoped to one row of a stream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    /// The row does not have one value per declared field.
    #[error("row has {actual} values but the stream declares {expected} fields")]
    Arity { expected: usize, actual: usize },

    /// The column mapped to a field is past the end of the result row.
    #[error("field '{field}' maps to column {ordinal} but the row has {cells} cells")]
    MissingCell {
        field: String,
        ordinal: usize,
        cells: usize,
    },

    /// A single field failed; the whole row is rejected.
    #[error("field '{field}': {source}")]
    Field {
        field: String,
        #[source]
        source: CodecError,
    },
}

/// Result type alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
