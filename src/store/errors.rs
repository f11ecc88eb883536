//! # Store Errors
//!
//! Failures raised by a tabular store. These are never folded into the
//! `-1` field sentinel: an absent field and a failing store are different
//! conditions and callers must be able to tell them apart.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Tabular store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid table name: '{0}'")]
    InvalidName(String),

    #[error("Datastore is locked: {0}")]
    Locked(String),

    #[error("Malformed table '{table}': {reason}")]
    Malformed { table: String, reason: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl StoreError {
    /// Returns the error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::TableNotFound(_) => "ROWFIELD_TABLE_NOT_FOUND",
            StoreError::TableAlreadyExists(_) => "ROWFIELD_TABLE_EXISTS",
            StoreError::InvalidQuery(_) => "ROWFIELD_INVALID_QUERY",
            StoreError::InvalidName(_) => "ROWFIELD_INVALID_TABLE_NAME",
            StoreError::Locked(_) => "ROWFIELD_STORE_LOCKED",
            StoreError::Malformed { .. } => "ROWFIELD_MALFORMED_TABLE",
            StoreError::Io(_) => "ROWFIELD_STORE_IO",
        }
    }

    pub(crate) fn malformed(table: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::Malformed {
            table: table.into(),
            reason: reason.to_string(),
        }
    }
}
