//! Cursor consumer errors

use thiserror::Error;

use crate::store::StoreError;

use super::row_cursor::CursorState;

/// Result type for cursor operations
pub type CursorResult<T> = Result<T, CursorError>;

/// Errors raised while consuming a cursor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// `current()` called without a row positioned by `move_next`
    #[error("No current row: cursor is {0}")]
    NoCurrentRow(CursorState),

    /// Failure inside the store, passed through unchanged
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CursorError {
    /// True for caller contract violations, false for store failures
    pub fn is_usage_error(&self) -> bool {
        matches!(self, CursorError::NoCurrentRow(_))
    }

    /// Returns the error code
    pub fn code(&self) -> &'static str {
        match self {
            CursorError::NoCurrentRow(_) => "ROWFIELD_NO_CURRENT_ROW",
            CursorError::Store(e) => e.code(),
        }
    }
}
