//! Rows of one table held in memory, and the cursor that scans them

use std::sync::Arc;

use crate::observability::{log_event_with_fields, Event};
use crate::record::Record;
use crate::schema::SchemaDescriptor;

use super::errors::StoreResult;
use super::filter::{CompiledFilter, QueryFilter};
use super::interface::Cursor;

/// Schema plus rows in insertion order
#[derive(Debug, Clone)]
pub struct TableData {
    schema: Arc<SchemaDescriptor>,
    rows: Vec<Record>,
}

impl TableData {
    pub fn new(schema: Arc<SchemaDescriptor>) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Arc<SchemaDescriptor> {
        &self.schema
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn push(&mut self, record: Record) {
        self.rows.push(record);
    }

    /// Compiles `filter` against this table and opens a cursor.
    pub fn scan(&self, filter: &QueryFilter) -> StoreResult<ScanCursor<'_>> {
        let clause = filter.where_clause.as_deref().unwrap_or("");
        let compiled = CompiledFilter::compile(&self.schema, filter).inspect_err(|e| {
            log_event_with_fields(
                Event::SearchRejected,
                &[("table", self.schema.name()), ("where", clause), ("code", e.code())],
            );
        })?;
        log_event_with_fields(
            Event::SearchStart,
            &[("table", self.schema.name()), ("where", clause)],
        );
        Ok(ScanCursor {
            data: self,
            filter: compiled,
            next: 0,
            current: None,
            matched: 0,
        })
    }
}

/// Lazy cursor over a [`TableData`]: rows are filtered one `move_next` at
/// a time, never materialized up front.
#[derive(Debug)]
pub struct ScanCursor<'t> {
    data: &'t TableData,
    filter: CompiledFilter,
    /// Index of the next row to examine
    next: usize,
    current: Option<&'t Record>,
    matched: usize,
}

impl Cursor for ScanCursor<'_> {
    fn schema(&self) -> &Arc<SchemaDescriptor> {
        &self.data.schema
    }

    fn move_next(&mut self) -> StoreResult<bool> {
        let data = self.data;
        self.current = None;
        while let Some(record) = data.rows.get(self.next) {
            self.next += 1;
            if self.filter.matches(record) {
                self.current = Some(record);
                self.matched += 1;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn current(&self) -> Option<&Record> {
        self.current
    }
}

impl Drop for ScanCursor<'_> {
    fn drop(&mut self) {
        let matched = self.matched.to_string();
        log_event_with_fields(
            Event::CursorClosed,
            &[("rows", matched.as_str()), ("table", self.data.schema.name())],
        );
    }
}
