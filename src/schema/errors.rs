//! Schema error types
//!
//! Error codes:
//! - ROWFIELD_EMPTY_FIELD_NAME
//! - ROWFIELD_DUPLICATE_FIELD
//! - ROWFIELD_DUPLICATE_ROLE
//! - ROWFIELD_ROLE_TYPE_MISMATCH
//! - ROWFIELD_UNKNOWN_SCHEMA
//! - ROWFIELD_SCHEMA_IMMUTABLE
//! - ROWFIELD_MALFORMED_SCHEMA
//!
//! Field lookups never produce these; an unresolved name is the `-1`
//! sentinel, not an error.

use std::fmt;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// A field was declared with an empty name
    EmptyFieldName,
    /// Two fields share a name, ignoring case
    DuplicateField,
    /// A role is bound to more than one field
    DuplicateRole,
    /// A role is bound to a field of the wrong type
    RoleTypeMismatch,
    /// No schema registered under that name
    UnknownSchema,
    /// Attempt to replace a registered schema
    SchemaImmutable,
    /// Schema file unreadable or not valid JSON
    MalformedSchema,
    /// Table name cannot be used as a file name
    InvalidTableName,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::EmptyFieldName => "ROWFIELD_EMPTY_FIELD_NAME",
            SchemaErrorCode::DuplicateField => "ROWFIELD_DUPLICATE_FIELD",
            SchemaErrorCode::DuplicateRole => "ROWFIELD_DUPLICATE_ROLE",
            SchemaErrorCode::RoleTypeMismatch => "ROWFIELD_ROLE_TYPE_MISMATCH",
            SchemaErrorCode::UnknownSchema => "ROWFIELD_UNKNOWN_SCHEMA",
            SchemaErrorCode::SchemaImmutable => "ROWFIELD_SCHEMA_IMMUTABLE",
            SchemaErrorCode::MalformedSchema => "ROWFIELD_MALFORMED_SCHEMA",
            SchemaErrorCode::InvalidTableName => "ROWFIELD_INVALID_TABLE_NAME",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    /// Table the schema describes, if known
    schema_name: Option<String>,
    /// Offending field, if applicable
    field: Option<String>,
}

impl SchemaError {
    fn new(
        code: SchemaErrorCode,
        message: String,
        schema_name: Option<String>,
        field: Option<String>,
    ) -> Self {
        Self {
            code,
            message,
            schema_name,
            field,
        }
    }

    /// Field at `ordinal` has an empty name
    pub fn empty_field_name(schema_name: impl Into<String>, ordinal: usize) -> Self {
        let name = schema_name.into();
        Self::new(
            SchemaErrorCode::EmptyFieldName,
            format!("Field at ordinal {} of '{}' has an empty name", ordinal, name),
            Some(name),
            None,
        )
    }

    /// `field` is declared more than once, ignoring case
    pub fn duplicate_field(schema_name: impl Into<String>, field: impl Into<String>) -> Self {
        let name = schema_name.into();
        let field = field.into();
        Self::new(
            SchemaErrorCode::DuplicateField,
            format!("Field '{}' is declared more than once in '{}'", field, name),
            Some(name),
            Some(field),
        )
    }

    /// `role` is already bound to another field
    pub fn duplicate_role(
        schema_name: impl Into<String>,
        role: &str,
        field: impl Into<String>,
    ) -> Self {
        let name = schema_name.into();
        let field = field.into();
        Self::new(
            SchemaErrorCode::DuplicateRole,
            format!(
                "Role '{}' of field '{}' is already bound in '{}'",
                role, field, name
            ),
            Some(name),
            Some(field),
        )
    }

    /// `field` carries `role` but its type cannot serve that role
    pub fn role_type_mismatch(
        schema_name: impl Into<String>,
        field: impl Into<String>,
        role: &str,
        type_name: &str,
    ) -> Self {
        let name = schema_name.into();
        let field = field.into();
        Self::new(
            SchemaErrorCode::RoleTypeMismatch,
            format!(
                "Field '{}' of type {} cannot hold role '{}'",
                field, type_name, role
            ),
            Some(name),
            Some(field),
        )
    }

    /// No schema registered for `schema_name`
    pub fn unknown_schema(schema_name: impl Into<String>) -> Self {
        let name = schema_name.into();
        Self::new(
            SchemaErrorCode::UnknownSchema,
            format!("Schema '{}' not found", name),
            Some(name),
            None,
        )
    }

    /// A schema is already registered for `schema_name`
    pub fn schema_immutable(schema_name: impl Into<String>) -> Self {
        let name = schema_name.into();
        Self::new(
            SchemaErrorCode::SchemaImmutable,
            format!("Schema '{}' is already registered", name),
            Some(name),
            None,
        )
    }

    /// Schema file at `path` could not be read or parsed
    pub fn malformed_schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::MalformedSchema,
            format!("Malformed schema file '{}': {}", path.into(), reason.into()),
            None,
            None,
        )
    }

    /// Table name that would not stay a single file inside its directory
    pub fn invalid_table_name(schema_name: impl Into<String>) -> Self {
        let name = schema_name.into();
        Self::new(
            SchemaErrorCode::InvalidTableName,
            format!(
                "Table name '{}' must be non-empty, must not start with '.' and must not contain path separators",
                name
            ),
            Some(name),
            None,
        )
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the schema name if applicable
    pub fn schema_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }

    /// Returns the offending field if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::DuplicateField.code(), "ROWFIELD_DUPLICATE_FIELD");
        assert_eq!(SchemaErrorCode::UnknownSchema.code(), "ROWFIELD_UNKNOWN_SCHEMA");
        assert_eq!(SchemaErrorCode::MalformedSchema.code(), "ROWFIELD_MALFORMED_SCHEMA");
        assert_eq!(SchemaErrorCode::InvalidTableName.code(), "ROWFIELD_INVALID_TABLE_NAME");
    }

    #[test]
    fn test_duplicate_field_context() {
        let err = SchemaError::duplicate_field("luCodeInspection", "ACTION");
        assert_eq!(err.schema_name(), Some("luCodeInspection"));
        assert_eq!(err.field(), Some("ACTION"));

        let display = format!("{}", err);
        assert!(display.starts_with("ROWFIELD_DUPLICATE_FIELD"));
        assert!(display.contains("ACTION"));
    }
}
