//! rowfield - field-by-name access over rows of a tabular store
//!
//! Resolves field names to ordinals against a table's schema, ignoring
//! case, with `-1` for names the schema does not have. Rows are read
//! through forward-only cursors whose handles are released on drop.

pub mod cli;
pub mod cursor;
pub mod observability;
pub mod record;
pub mod schema;
pub mod store;
