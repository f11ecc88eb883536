//! Records and record accessors
//!
//! A [`Record`] is one row's values in ordinal order, checked against its
//! schema on construction. A [`RecordAccessor`] pairs a record with its
//! schema for the duration of one cursor step and exposes field lookup.

mod accessor;
mod errors;
mod record;

pub use accessor::RecordAccessor;
pub use errors::{RecordError, RecordResult};
pub use record::Record;
