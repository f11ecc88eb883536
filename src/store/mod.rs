//! Tabular store collaborator
//!
//! The resolver and cursor layers only consume the [`TabularStore`],
//! [`Table`] and [`Cursor`] traits. Two implementations are bundled:
//!
//! - [`MemoryStore`]: tables built in memory, for tests and embedding
//! - [`FileStore`]: a directory of JSON table files guarded by a lock file
//!
//! # Resource order
//!
//! Store, table and cursor handles nest by borrowing. Dropping them releases
//! resources in reverse acquisition order on every exit path.

mod errors;
mod file;
pub mod filter;
mod interface;
mod memory;
mod scan;

pub use errors::{StoreError, StoreResult};
pub use file::{FileStore, FileTable, StoreOptions};
pub use filter::{CompareOp, CompiledFilter, Predicate, QueryFilter};
pub use interface::{Cursor, Table, TabularStore};
pub use memory::{MemoryStore, MemoryTable};
pub use scan::{ScanCursor, TableData};
