//! Ordered schema of a table or feature class

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};
use super::resolver::{fold_name, FieldResolver};
use super::types::{FieldDefinition, FieldRole, FieldSpec, FieldType};

/// Declaration form of a schema, as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSpec {
    /// Table name
    pub name: String,
    /// Fields in physical order
    pub fields: Vec<FieldSpec>,
}

/// Ordered field definitions for one table.
///
/// Field order is physical column order: ordinal 0 is the first field.
/// Construction accepts malformed input (duplicate names, repeated roles)
/// so that lookups stay defined; [`validate_structure`](Self::validate_structure)
/// reports those problems for callers that need a well-formed schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SchemaSpec", into = "SchemaSpec")]
pub struct SchemaDescriptor {
    name: String,
    fields: Vec<FieldDefinition>,
    resolver: FieldResolver,
    /// Role -> ordinal of the first field carrying it
    roles: HashMap<FieldRole, usize>,
}

impl SchemaDescriptor {
    /// Creates a schema, assigning ordinals in declaration order.
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        let fields: Vec<FieldDefinition> = fields
            .into_iter()
            .enumerate()
            .map(|(ordinal, spec)| FieldDefinition::from_spec(spec, ordinal))
            .collect();

        let mut roles = HashMap::new();
        for field in &fields {
            if field.role != FieldRole::Regular {
                roles.entry(field.role).or_insert(field.ordinal);
            }
        }

        Self {
            name: name.into(),
            resolver: FieldResolver::build(&fields),
            fields,
            roles,
        }
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in ordinal order
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Field at `ordinal`, if in range
    pub fn field(&self, ordinal: usize) -> Option<&FieldDefinition> {
        self.fields.get(ordinal)
    }

    /// Name index for this snapshot
    pub fn resolver(&self) -> &FieldResolver {
        &self.resolver
    }

    /// Ordinal of `name`, or `-1` when it does not resolve.
    pub fn find_field<'a>(&self, name: impl Into<Option<&'a str>>) -> i32 {
        self.resolver.resolve(name)
    }

    /// Field resolved by name, if present
    pub fn field_by_name<'a>(&self, name: impl Into<Option<&'a str>>) -> Option<&FieldDefinition> {
        self.resolver
            .lookup(name)
            .and_then(|ordinal| self.fields.get(ordinal))
    }

    /// Field bound to `role`, or `None` when the schema has no such role.
    ///
    /// `FieldRole::Regular` is never bound.
    pub fn role_field(&self, role: FieldRole) -> Option<&FieldDefinition> {
        self.roles
            .get(&role)
            .and_then(|ordinal| self.fields.get(*ordinal))
    }

    fn role_field_name(&self, role: FieldRole) -> &str {
        self.role_field(role).map_or("", |f| f.name.as_str())
    }

    /// Name of the object identifier field, or `""`
    pub fn object_id_field_name(&self) -> &str {
        self.role_field_name(FieldRole::ObjectId)
    }

    /// Name of the subtype field, or `""` when the table has no subtypes
    pub fn subtype_field_name(&self) -> &str {
        self.role_field_name(FieldRole::Subtype)
    }

    /// Name of the shape field, or `""` for non-spatial tables
    pub fn shape_field_name(&self) -> &str {
        self.role_field_name(FieldRole::Shape)
    }

    /// Checks that the schema is well formed.
    ///
    /// - Field names are non-empty and unique ignoring case
    /// - Each role is bound to at most one field
    /// - Object id fields have type objectid, shape fields have type geometry,
    ///   subtype fields have type integer
    pub fn validate_structure(&self) -> SchemaResult<()> {
        let mut seen = HashSet::with_capacity(self.fields.len());
        let mut bound = HashSet::new();

        for field in &self.fields {
            if field.name.is_empty() {
                return Err(SchemaError::empty_field_name(&self.name, field.ordinal));
            }
            if !seen.insert(fold_name(&field.name)) {
                return Err(SchemaError::duplicate_field(&self.name, &field.name));
            }

            let expected = match field.role {
                FieldRole::Regular => continue,
                FieldRole::ObjectId => FieldType::ObjectId,
                FieldRole::Subtype => FieldType::Integer,
                FieldRole::Shape => FieldType::Geometry,
            };
            if !bound.insert(field.role) {
                return Err(SchemaError::duplicate_role(
                    &self.name,
                    field.role.as_str(),
                    &field.name,
                ));
            }
            if field.field_type != expected {
                return Err(SchemaError::role_type_mismatch(
                    &self.name,
                    &field.name,
                    field.role.as_str(),
                    field.field_type.type_name(),
                ));
            }
        }

        Ok(())
    }
}

impl From<SchemaSpec> for SchemaDescriptor {
    fn from(spec: SchemaSpec) -> Self {
        SchemaDescriptor::new(spec.name, spec.fields)
    }
}

impl From<SchemaDescriptor> for SchemaSpec {
    fn from(schema: SchemaDescriptor) -> Self {
        SchemaSpec {
            fields: schema.fields.iter().map(FieldDefinition::to_spec).collect(),
            name: schema.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FIELD_NOT_FOUND;
    use serde_json::json;

    fn land_use_case() -> SchemaDescriptor {
        SchemaDescriptor::new(
            "LocalGovernment.GDB.LandUseCase",
            vec![
                FieldSpec::object_id("OBJECTID"),
                FieldSpec::shape("SHAPE"),
                FieldSpec::new("CASEID", FieldType::Integer),
                FieldSpec::new("CASENAME", FieldType::String),
                FieldSpec::new("Applicant", FieldType::String),
                FieldSpec::new("CASETYPE", FieldType::String),
            ],
        )
    }

    #[test]
    fn test_ordinals_follow_declaration_order() {
        let schema = land_use_case();
        for (i, field) in schema.fields().iter().enumerate() {
            assert_eq!(field.ordinal, i);
        }
        assert_eq!(schema.field_count(), 6);
    }

    #[test]
    fn test_role_bound_names() {
        let schema = land_use_case();

        assert_eq!(schema.object_id_field_name(), "OBJECTID");
        assert_eq!(schema.shape_field_name(), "SHAPE");
        assert_eq!(schema.subtype_field_name(), "");
        assert!(schema.role_field(FieldRole::Subtype).is_none());
        assert!(schema.role_field(FieldRole::Regular).is_none());
    }

    #[test]
    fn test_absent_role_never_matches() {
        let schema = land_use_case();

        assert_eq!(schema.find_field(schema.subtype_field_name()), FIELD_NOT_FOUND);
        assert_eq!(schema.find_field(schema.object_id_field_name()), 0);
        assert_eq!(schema.find_field(schema.shape_field_name()), 1);
    }

    #[test]
    fn test_field_by_name() {
        let schema = land_use_case();

        let field = schema.field_by_name("casename").unwrap();
        assert_eq!(field.name, "CASENAME");
        assert_eq!(field.ordinal, 3);
        assert!(schema.field_by_name("nope").is_none());
    }

    #[test]
    fn test_well_formed_schema_validates() {
        assert!(land_use_case().validate_structure().is_ok());
    }

    #[test]
    fn test_duplicate_name_rejected_by_validation() {
        let schema = SchemaDescriptor::new(
            "dup",
            vec![
                FieldSpec::object_id("OBJECTID"),
                FieldSpec::new("objectid", FieldType::Integer),
            ],
        );

        let err = schema.validate_structure().unwrap_err();
        assert_eq!(err.code().code(), "ROWFIELD_DUPLICATE_FIELD");
        assert_eq!(schema.find_field("OBJECTID"), 0);
    }

    #[test]
    fn test_role_type_mismatch_rejected() {
        let mut shape = FieldSpec::shape("SHAPE");
        shape.field_type = FieldType::String;
        let schema = SchemaDescriptor::new("bad", vec![FieldSpec::object_id("OBJECTID"), shape]);

        let err = schema.validate_structure().unwrap_err();
        assert_eq!(err.code().code(), "ROWFIELD_ROLE_TYPE_MISMATCH");
    }

    #[test]
    fn test_duplicate_role_first_binding_wins() {
        let schema = SchemaDescriptor::new(
            "two_ids",
            vec![FieldSpec::object_id("OID_A"), FieldSpec::object_id("OID_B")],
        );

        assert_eq!(schema.object_id_field_name(), "OID_A");
        let err = schema.validate_structure().unwrap_err();
        assert_eq!(err.code().code(), "ROWFIELD_DUPLICATE_ROLE");
    }

    #[test]
    fn test_serde_roundtrip_rebuilds_index() {
        let value = json!({
            "name": "luCodeInspection",
            "fields": [
                {"name": "OBJECTID", "type": "objectid", "role": "objectid", "nullable": false},
                {"name": "INSPECTID", "type": "integer"},
            ]
        });

        let schema: SchemaDescriptor = serde_json::from_value(value).unwrap();
        assert_eq!(schema.find_field("inspectid"), 1);
        assert_eq!(schema.object_id_field_name(), "OBJECTID");

        let back = serde_json::to_value(&schema).unwrap();
        assert_eq!(back["fields"][1]["name"], "INSPECTID");
        assert_eq!(back["fields"][1]["role"], "regular");
    }
}
