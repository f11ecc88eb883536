//! Row values in physical field order

use serde_json::{Map, Value};

use crate::schema::SchemaDescriptor;

use super::errors::{RecordError, RecordResult};

/// One row's values, in ordinal order.
///
/// A record does not own its schema. It is only meaningful next to the
/// schema it was checked against, which is why row access goes through a
/// [`RecordAccessor`](super::RecordAccessor).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    /// Builds a record from positional values.
    ///
    /// Fails if the value count differs from the schema's field count or a
    /// value does not fit its field's type.
    pub fn new(schema: &SchemaDescriptor, values: Vec<Value>) -> RecordResult<Self> {
        if values.len() != schema.field_count() {
            return Err(RecordError::ArityMismatch {
                schema: schema.name().to_string(),
                expected: schema.field_count(),
                actual: values.len(),
            });
        }

        for (field, value) in schema.fields().iter().zip(&values) {
            if field.accepts(value) {
                continue;
            }
            if value.is_null() {
                return Err(RecordError::NullNotAllowed(field.name.clone()));
            }
            return Err(RecordError::TypeMismatch {
                field: field.name.clone(),
                expected: field.field_type.type_name(),
                actual: json_type_name(value).to_string(),
            });
        }

        Ok(Self { values })
    }

    /// Builds a record from a JSON object keyed by field name.
    ///
    /// Keys resolve ignoring case. Fields without a key are null.
    pub fn from_named(schema: &SchemaDescriptor, object: &Value) -> RecordResult<Self> {
        let map: &Map<String, Value> = object.as_object().ok_or(RecordError::NotAnObject)?;

        let mut values = vec![Value::Null; schema.field_count()];
        for (key, value) in map {
            let ordinal = schema.resolver().lookup(key.as_str()).ok_or_else(|| {
                RecordError::UnknownField {
                    schema: schema.name().to_string(),
                    field: key.clone(),
                }
            })?;
            values[ordinal] = value.clone();
        }

        Self::new(schema, values)
    }

    /// Values in ordinal order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value at `ordinal`, if in range
    pub fn get(&self, ordinal: usize) -> Option<&Value> {
        self.values.get(ordinal)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "double",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
