//! In-memory tabular store

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::record::Record;
use crate::schema::{fold_name, SchemaDescriptor};

use super::errors::{StoreError, StoreResult};
use super::filter::QueryFilter;
use super::interface::{Table, TabularStore};
use super::scan::{ScanCursor, TableData};

/// A store whose tables live entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Tables keyed by folded name
    tables: HashMap<String, TableData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty table. The schema must be well formed.
    pub fn create_table(&mut self, schema: SchemaDescriptor) -> StoreResult<Arc<SchemaDescriptor>> {
        schema
            .validate_structure()
            .map_err(|e| StoreError::malformed(schema.name(), e))?;

        let key = fold_name(schema.name());
        if self.tables.contains_key(&key) {
            return Err(StoreError::TableAlreadyExists(schema.name().to_string()));
        }

        let schema = Arc::new(schema);
        self.tables.insert(key, TableData::new(Arc::clone(&schema)));
        Ok(schema)
    }

    fn table_mut(&mut self, table: &str) -> StoreResult<&mut TableData> {
        self.tables
            .get_mut(&fold_name(table))
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))
    }

    /// Appends positional values as a row of `table`.
    pub fn insert(&mut self, table: &str, values: Vec<Value>) -> StoreResult<()> {
        let data = self.table_mut(table)?;
        let record = Record::new(data.schema(), values).map_err(|e| StoreError::malformed(table, e))?;
        data.push(record);
        Ok(())
    }

    /// Appends a JSON object keyed by field name as a row of `table`.
    pub fn insert_named(&mut self, table: &str, row: &Value) -> StoreResult<()> {
        let data = self.table_mut(table)?;
        let record = Record::from_named(data.schema(), row).map_err(|e| StoreError::malformed(table, e))?;
        data.push(record);
        Ok(())
    }
}

/// Table handle borrowed from a [`MemoryStore`]
#[derive(Debug)]
pub struct MemoryTable<'s> {
    data: &'s TableData,
}

impl TabularStore for MemoryStore {
    type Table<'s> = MemoryTable<'s>;

    fn open_table(&self, name: &str) -> StoreResult<MemoryTable<'_>> {
        self.tables
            .get(&fold_name(name))
            .map(|data| MemoryTable { data })
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    fn table_names(&self) -> StoreResult<Vec<String>> {
        let mut names: Vec<String> = self
            .tables
            .values()
            .map(|data| data.schema().name().to_string())
            .collect();
        names.sort();
        Ok(names)
    }
}

impl<'s> Table for MemoryTable<'s> {
    type Cursor<'t> = ScanCursor<'t> where Self: 't;

    fn name(&self) -> &str {
        self.data.schema().name()
    }

    fn schema(&self) -> Arc<SchemaDescriptor> {
        Arc::clone(self.data.schema())
    }

    fn search(&self, filter: &QueryFilter) -> StoreResult<ScanCursor<'_>> {
        self.data.scan(filter)
    }
}
