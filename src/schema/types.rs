//! Schema type definitions
//!
//! Supported field types:
//! - objectid: system-maintained 64-bit row identifier
//! - integer: 64-bit signed integer
//! - double: 64-bit floating point
//! - string: UTF-8 string
//! - date: RFC 3339 timestamp or `YYYY-MM-DD` date string
//! - geometry: opaque JSON object, never interpreted here
//! - guid: hyphenated UUID string

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Supported field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Row identifier maintained by the store
    ObjectId,
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point
    Double,
    /// UTF-8 string
    String,
    /// Calendar date or timestamp
    Date,
    /// Geometry payload
    Geometry,
    /// Globally unique identifier
    Guid,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::ObjectId => "objectid",
            FieldType::Integer => "integer",
            FieldType::Double => "double",
            FieldType::String => "string",
            FieldType::Date => "date",
            FieldType::Geometry => "geometry",
            FieldType::Guid => "guid",
        }
    }

    /// Checks whether a non-null JSON value is acceptable for this type.
    ///
    /// No coercion: an integer field never accepts `"12"`, a double field
    /// accepts any JSON number.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::ObjectId | FieldType::Integer => value.as_i64().is_some(),
            FieldType::Double => value.is_number(),
            FieldType::String => value.is_string(),
            FieldType::Date => value.as_str().map_or(false, is_date_literal),
            FieldType::Geometry => value.is_object(),
            FieldType::Guid => value
                .as_str()
                .map_or(false, |s| uuid::Uuid::parse_str(s).is_ok()),
        }
    }
}

fn is_date_literal(s: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(s).is_ok()
        || chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Special purpose a field serves within its schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    /// Ordinary data column
    #[default]
    Regular,
    /// Object identifier column
    ObjectId,
    /// Subtype discriminator column
    Subtype,
    /// Geometry holder column
    Shape,
}

impl FieldRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldRole::Regular => "regular",
            FieldRole::ObjectId => "objectid",
            FieldRole::Subtype => "subtype",
            FieldRole::Shape => "shape",
        }
    }
}

/// Field declaration as it appears before ordinals are assigned.
///
/// This is the on-disk form; `SchemaDescriptor::new` turns a list of
/// these into ordered [`FieldDefinition`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as declared
    pub name: String,
    /// Field data type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Role within the schema
    #[serde(default)]
    pub role: FieldRole,
    /// Whether the field accepts nulls
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl FieldSpec {
    /// Create a nullable regular field
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            role: FieldRole::Regular,
            nullable: true,
        }
    }

    /// Create the object identifier field
    pub fn object_id(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::ObjectId,
            role: FieldRole::ObjectId,
            nullable: false,
        }
    }

    /// Create a subtype discriminator field
    pub fn subtype(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Integer,
            role: FieldRole::Subtype,
            nullable: true,
        }
    }

    /// Create the shape field
    pub fn shape(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Geometry,
            role: FieldRole::Shape,
            nullable: true,
        }
    }

    /// Mark the field as not nullable
    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// A field bound to its physical position within a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    /// Field name as declared
    pub name: String,
    /// Zero-based physical position
    pub ordinal: usize,
    /// Field data type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Role within the schema
    pub role: FieldRole,
    /// Whether the field accepts nulls
    pub nullable: bool,
}

impl FieldDefinition {
    pub(crate) fn from_spec(spec: FieldSpec, ordinal: usize) -> Self {
        Self {
            name: spec.name,
            ordinal,
            field_type: spec.field_type,
            role: spec.role,
            nullable: spec.nullable,
        }
    }

    /// Returns the declaration form of this field
    pub fn to_spec(&self) -> FieldSpec {
        FieldSpec {
            name: self.name.clone(),
            field_type: self.field_type,
            role: self.role,
            nullable: self.nullable,
        }
    }

    /// Checks a value against this field's type and nullability
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            return self.nullable;
        }
        self.field_type.accepts(value)
    }
}
