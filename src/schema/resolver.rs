//! Field name to ordinal resolution
//!
//! Names match case-insensitively against the declared field names, in
//! ordinal order, first match wins. A name that matches nothing resolves to
//! [`FIELD_NOT_FOUND`]; that includes the empty string and a missing name.
//!
//! Resolution is a soft lookup. It never fails, so callers can probe for
//! optional fields (a subtype column that a table may not have) without
//! error handling at every call site.

use std::collections::HashMap;

use super::types::FieldDefinition;
use super::SchemaDescriptor;

/// Sentinel returned when a field name does not resolve
pub const FIELD_NOT_FOUND: i32 = -1;

/// Folds a field or table name for case-insensitive comparison.
pub fn fold_name(name: &str) -> String {
    name.chars().flat_map(char::to_lowercase).collect()
}

/// Precomputed name index for one schema snapshot.
///
/// Built once when the schema is constructed and never mutated, so every
/// lookup against the same snapshot returns the same ordinal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldResolver {
    /// Folded name -> first ordinal carrying it
    index: HashMap<String, usize>,
}

impl FieldResolver {
    /// Builds the index from fields in ordinal order.
    ///
    /// For malformed input with duplicate names the lowest ordinal wins.
    pub fn build(fields: &[FieldDefinition]) -> Self {
        let mut index = HashMap::with_capacity(fields.len());
        for field in fields {
            if field.name.is_empty() {
                continue;
            }
            index.entry(fold_name(&field.name)).or_insert(field.ordinal);
        }
        Self { index }
    }

    /// Returns the ordinal of `name`, or `None` when it does not resolve.
    pub fn lookup<'a>(&self, name: impl Into<Option<&'a str>>) -> Option<usize> {
        match name.into() {
            Some(name) if !name.is_empty() => self.index.get(&fold_name(name)).copied(),
            _ => None,
        }
    }

    /// Returns the ordinal of `name`, or [`FIELD_NOT_FOUND`].
    pub fn resolve<'a>(&self, name: impl Into<Option<&'a str>>) -> i32 {
        self.lookup(name)
            .and_then(|ordinal| i32::try_from(ordinal).ok())
            .unwrap_or(FIELD_NOT_FOUND)
    }

    /// Number of distinct resolvable names
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Resolves `name` against `schema`.
pub fn resolve<'a>(schema: &SchemaDescriptor, name: impl Into<Option<&'a str>>) -> i32 {
    schema.resolver().resolve(name)
}

/// Option-typed variant of [`resolve`].
pub fn lookup<'a>(schema: &SchemaDescriptor, name: impl Into<Option<&'a str>>) -> Option<usize> {
    schema.resolver().lookup(name)
}
