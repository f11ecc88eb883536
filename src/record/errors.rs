//! Record construction errors

use thiserror::Error;

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;

/// A record whose shape does not match its schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("Record for '{schema}' has {actual} values, schema declares {expected}")]
    ArityMismatch {
        schema: String,
        expected: usize,
        actual: usize,
    },

    #[error("Field '{field}' expects {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: String,
    },

    #[error("Field '{0}' does not accept null")]
    NullNotAllowed(String),

    #[error("Unknown field '{field}' for '{schema}'")]
    UnknownField { schema: String, field: String },

    #[error("Named record must be a JSON object")]
    NotAnObject,
}

impl RecordError {
    /// Returns the error code
    pub fn code(&self) -> &'static str {
        match self {
            RecordError::ArityMismatch { .. } => "ROWFIELD_RECORD_ARITY",
            RecordError::TypeMismatch { .. } => "ROWFIELD_RECORD_TYPE",
            RecordError::NullNotAllowed(_) => "ROWFIELD_RECORD_NULL",
            RecordError::UnknownField { .. } => "ROWFIELD_RECORD_UNKNOWN_FIELD",
            RecordError::NotAnObject => "ROWFIELD_RECORD_NOT_OBJECT",
        }
    }
}
