//! Scoped view of the cursor's current row

use serde_json::Value;

use crate::schema::{FieldDefinition, FieldRole, SchemaDescriptor};

use super::record::Record;

/// One row paired with the schema it was produced under.
///
/// An accessor borrows the cursor that produced it, so it cannot outlive the
/// advance step it was obtained in: calling `move_next` or dropping the
/// cursor while an accessor is alive does not compile. Accessors are neither
/// `Clone` nor shareable across consumers.
#[derive(Debug)]
pub struct RecordAccessor<'c> {
    schema: &'c SchemaDescriptor,
    record: &'c Record,
}

impl<'c> RecordAccessor<'c> {
    pub(crate) fn new(schema: &'c SchemaDescriptor, record: &'c Record) -> Self {
        Self { schema, record }
    }

    /// Ordinal of `name` in this row's schema, or `-1`.
    pub fn find_field<'n>(&self, name: impl Into<Option<&'n str>>) -> i32 {
        self.schema.find_field(name)
    }

    /// The schema's fields in ordinal order
    pub fn get_fields(&self) -> &'c [FieldDefinition] {
        self.schema.fields()
    }

    pub fn schema(&self) -> &'c SchemaDescriptor {
        self.schema
    }

    pub fn record(&self) -> &'c Record {
        self.record
    }

    /// Value at `ordinal`. A negative ordinal (the not-found sentinel) is
    /// `None` rather than a panic.
    pub fn get(&self, ordinal: i32) -> Option<&'c Value> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|ordinal| self.record.get(ordinal))
    }

    /// Value of the field named `name`, ignoring case
    pub fn get_by_name<'n>(&self, name: impl Into<Option<&'n str>>) -> Option<&'c Value> {
        self.schema
            .resolver()
            .lookup(name)
            .and_then(|ordinal| self.record.get(ordinal))
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get_by_name(name).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get_by_name(name).and_then(Value::as_f64)
    }

    pub fn get_str(&self, name: &str) -> Option<&'c str> {
        self.get_by_name(name).and_then(Value::as_str)
    }

    /// Object identifier of this row, if the schema has an object id field
    pub fn object_id(&self) -> Option<i64> {
        self.schema
            .role_field(FieldRole::ObjectId)
            .and_then(|field| self.record.get(field.ordinal))
            .and_then(Value::as_i64)
    }
}
