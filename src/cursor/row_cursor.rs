//! Stateful consumer over a store cursor

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use crate::observability::{log_event_with_fields, Event};
use crate::record::RecordAccessor;
use crate::schema::SchemaDescriptor;
use crate::store::{Cursor, QueryFilter, Table};

use super::errors::{CursorError, CursorResult};

/// Position of a [`RowCursor`]
///
/// ```text
/// Idle --move_next=true--> HasCurrent --move_next=true--> HasCurrent
///   |                          |
///   +---move_next=false--------+--move_next=false--> Exhausted (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// No `move_next` yet
    Idle,
    /// Positioned on a row
    HasCurrent,
    /// No more rows; terminal
    Exhausted,
}

impl CursorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CursorState::Idle => "idle",
            CursorState::HasCurrent => "positioned",
            CursorState::Exhausted => "exhausted",
        }
    }
}

impl fmt::Display for CursorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Wraps a store cursor and enforces the consumer state machine.
///
/// Accessors returned by [`current`](Self::current) borrow the cursor, so
/// the compiler rejects holding one across `move_next`.
#[derive(Debug)]
pub struct RowCursor<C> {
    inner: C,
    state: CursorState,
    rows_read: usize,
}

impl<C: Cursor> RowCursor<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            state: CursorState::Idle,
            rows_read: 0,
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Rows successfully positioned so far
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    pub fn schema(&self) -> &Arc<SchemaDescriptor> {
        self.inner.schema()
    }

    /// Advances to the next row.
    ///
    /// Once exhausted, returns `false` without touching the store. A store
    /// failure is returned unchanged and leaves the cursor exhausted.
    pub fn move_next(&mut self) -> CursorResult<bool> {
        if self.state == CursorState::Exhausted {
            return Ok(false);
        }

        match self.inner.move_next() {
            Ok(true) => {
                self.state = CursorState::HasCurrent;
                self.rows_read += 1;
                Ok(true)
            }
            Ok(false) => {
                self.state = CursorState::Exhausted;
                Ok(false)
            }
            Err(e) => {
                self.state = CursorState::Exhausted;
                log_event_with_fields(
                    Event::StoreFailure,
                    &[("code", e.code()), ("table", self.inner.schema().name())],
                );
                Err(CursorError::Store(e))
            }
        }
    }

    /// Accessor for the row positioned by the last successful `move_next`.
    pub fn current(&self) -> CursorResult<RecordAccessor<'_>> {
        if self.state != CursorState::HasCurrent {
            return Err(CursorError::NoCurrentRow(self.state));
        }
        let record = self
            .inner
            .current()
            .ok_or(CursorError::NoCurrentRow(self.state))?;
        Ok(RecordAccessor::new(self.inner.schema(), record))
    }

    /// Drives the cursor to the end, handing each row to `f`.
    ///
    /// `f` may stop early with `ControlFlow::Break`. Returns the number of
    /// rows visited.
    pub fn for_each_row<F>(&mut self, mut f: F) -> CursorResult<usize>
    where
        F: FnMut(&RecordAccessor<'_>) -> ControlFlow<()>,
    {
        let mut visited = 0;
        while self.move_next()? {
            visited += 1;
            let row = self.current()?;
            if f(&row).is_break() {
                break;
            }
        }
        Ok(visited)
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

/// Runs `filter` against `table` and wraps the resulting cursor.
pub fn search<'t, T: Table>(
    table: &'t T,
    filter: &QueryFilter,
) -> CursorResult<RowCursor<T::Cursor<'t>>> {
    Ok(RowCursor::new(table.search(filter)?))
}
