//! Schema loader for schema files on disk
//!
//! - Schemas stored as `<dir>/<table>.schema.json`, one file per table
//! - Each file holds a [`SchemaSpec`] and must pass structure validation
//! - Table names are matched ignoring case, like field names

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::descriptor::{SchemaDescriptor, SchemaSpec};
use super::errors::{SchemaError, SchemaResult};
use super::resolver::fold_name;

const SCHEMA_SUFFIX: &str = ".schema.json";

/// True if `name` can name a file directly inside a directory.
///
/// Rejects empty names, names starting with `.` (which also covers `..`
/// and the store lock file), path separators and control characters.
pub fn is_file_safe_name(name: &str) -> bool {
    !name.trim().is_empty()
        && !name.starts_with('.')
        && !name
            .chars()
            .any(|c| matches!(c, '/' | '\\' | ':') || c.is_control())
}

/// Schema loader that reads schema files and keeps them in memory.
pub struct SchemaLoader {
    /// Directory containing schema files
    schema_dir: PathBuf,
    /// Loaded schemas indexed by folded table name
    schemas: HashMap<String, Arc<SchemaDescriptor>>,
}

impl SchemaLoader {
    /// Creates a loader for `schema_dir`. Nothing is read until `load_all`.
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            schemas: HashMap::new(),
        }
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every `*.schema.json` file in the schema directory.
    ///
    /// A missing directory loads nothing.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        if !self.schema_dir.exists() {
            return Ok(());
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_schema(
                self.schema_dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_schema(
                    self.schema_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;

            let path = entry.path();
            let is_schema = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.ends_with(SCHEMA_SUFFIX));
            if !is_schema {
                continue;
            }

            let schema = Self::read_schema_file(&path)?;
            self.register(schema)?;
        }

        Ok(())
    }

    /// Reads and validates a single schema file.
    pub fn read_schema_file(path: &Path) -> SchemaResult<SchemaDescriptor> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;

        let spec: SchemaSpec = serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed_schema(path.display().to_string(), format!("Invalid JSON: {}", e))
        })?;

        let schema = SchemaDescriptor::from(spec);
        schema.validate_structure()?;
        Ok(schema)
    }

    /// Registers a schema directly.
    ///
    /// Registered schemas are immutable; a second schema for the same table
    /// name is rejected.
    pub fn register(&mut self, schema: SchemaDescriptor) -> SchemaResult<Arc<SchemaDescriptor>> {
        schema.validate_structure()?;

        let key = fold_name(schema.name());
        if self.schemas.contains_key(&key) {
            return Err(SchemaError::schema_immutable(schema.name()));
        }

        let schema = Arc::new(schema);
        self.schemas.insert(key, Arc::clone(&schema));
        Ok(schema)
    }

    /// Gets a schema by table name, ignoring case.
    pub fn get(&self, table: &str) -> Option<Arc<SchemaDescriptor>> {
        self.schemas.get(&fold_name(table)).cloned()
    }

    /// Gets a schema by table name or fails with `ROWFIELD_UNKNOWN_SCHEMA`.
    pub fn require(&self, table: &str) -> SchemaResult<Arc<SchemaDescriptor>> {
        self.get(table)
            .ok_or_else(|| SchemaError::unknown_schema(table))
    }

    pub fn exists(&self, table: &str) -> bool {
        self.schemas.contains_key(&fold_name(table))
    }

    /// Returns all loaded schemas.
    pub fn all_schemas(&self) -> impl Iterator<Item = &Arc<SchemaDescriptor>> {
        self.schemas.values()
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Writes a schema file for `schema` and returns its path.
    pub fn save_schema(&self, schema: &SchemaDescriptor) -> SchemaResult<PathBuf> {
        if !is_file_safe_name(schema.name()) {
            return Err(SchemaError::invalid_table_name(schema.name()));
        }

        let path = self
            .schema_dir
            .join(format!("{}{}", schema.name(), SCHEMA_SUFFIX));

        if path.exists() {
            return Err(SchemaError::schema_immutable(schema.name()));
        }

        fs::create_dir_all(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_schema(
                self.schema_dir.display().to_string(),
                format!("Failed to create schema directory: {}", e),
            )
        })?;

        let content = serde_json::to_string_pretty(schema).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to serialize schema: {}", e),
            )
        })?;

        fs::write(&path, content).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to write file: {}", e),
            )
        })?;

        Ok(path)
    }
}
