//! Schema subsystem
//!
//! A [`SchemaDescriptor`] is the ordered field list of one table. It is
//! created when the table is opened and shared read-only (behind an `Arc`)
//! by every cursor and record derived from that table.
//!
//! # Resolution rules
//!
//! - Names match ignoring case, scanned in ordinal order, first match wins
//! - Unresolved names yield `-1` ([`FIELD_NOT_FOUND`]), never an error
//! - Role-bound names (object id, subtype, shape) are `""` when absent, so
//!   resolving an absent role yields `-1`

mod descriptor;
mod errors;
mod loader;
mod resolver;
mod types;

pub use descriptor::{SchemaDescriptor, SchemaSpec};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use loader::{is_file_safe_name, SchemaLoader};
pub use resolver::{fold_name, lookup, resolve, FieldResolver, FIELD_NOT_FOUND};
pub use types::{FieldDefinition, FieldRole, FieldSpec, FieldType};
