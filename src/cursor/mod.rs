//! Cursor consumption
//!
//! [`RowCursor`] wraps any store [`Cursor`](crate::store::Cursor) and tracks
//! the `Idle -> HasCurrent -> Exhausted` consumer states. Reading the
//! current row outside `HasCurrent` is a usage error; store failures pass
//! through unchanged.

mod errors;
mod row_cursor;

pub use errors::{CursorError, CursorResult};
pub use row_cursor::{search, CursorState, RowCursor};
