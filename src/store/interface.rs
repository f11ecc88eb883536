//! Capability interface of a tabular store
//!
//! Handles nest by borrowing. A table borrows its store and a cursor
//! borrows its table, so a cursor is always released before its table and
//! a table before its store, on every exit path.

use std::sync::Arc;

use crate::record::Record;
use crate::schema::SchemaDescriptor;

use super::errors::StoreResult;
use super::filter::QueryFilter;

/// A datastore that can open tables by name.
pub trait TabularStore {
    type Table<'s>: Table
    where
        Self: 's;

    /// Opens a table. Names match ignoring case.
    fn open_table(&self, name: &str) -> StoreResult<Self::Table<'_>>;

    /// Names of all tables in the store, sorted
    fn table_names(&self) -> StoreResult<Vec<String>>;
}

/// An open table or feature class.
pub trait Table {
    type Cursor<'t>: Cursor
    where
        Self: 't;

    /// Table name as declared by its schema
    fn name(&self) -> &str;

    /// Schema snapshot taken when the table was opened
    fn schema(&self) -> Arc<SchemaDescriptor>;

    /// Runs a query and returns a forward-only cursor over the matches.
    ///
    /// Query errors surface here, before any row is read.
    fn search(&self, filter: &QueryFilter) -> StoreResult<Self::Cursor<'_>>;
}

/// A forward-only, single-pass cursor.
pub trait Cursor {
    /// Schema shared by every row this cursor produces
    fn schema(&self) -> &Arc<SchemaDescriptor>;

    /// Advances to the next row. `Ok(false)` means the cursor is exhausted.
    fn move_next(&mut self) -> StoreResult<bool>;

    /// Row positioned by the last successful `move_next`, if any
    fn current(&self) -> Option<&Record>;
}
