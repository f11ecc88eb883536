//! Directory-backed local store
//!
//! Layout:
//! - `<dir>/<table>.json` holds one table: its schema and its rows
//! - `<dir>/.lock` marks the directory as open
//!
//! The lock file is created with create-new semantics when the store opens
//! and removed when the [`FileStore`] is dropped, so the directory can be
//! moved or deleted as soon as the handle goes out of scope.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::observability::{log_event_with_fields, Event, Logger};
use crate::record::Record;
use crate::schema::{fold_name, is_file_safe_name, SchemaDescriptor, SchemaSpec};

use super::errors::{StoreError, StoreResult};
use super::filter::QueryFilter;
use super::interface::{Table, TabularStore};
use super::scan::{ScanCursor, TableData};

const LOCK_FILE: &str = ".lock";
const TABLE_EXTENSION: &str = "json";

/// Options for opening a [`FileStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Take the exclusive lock file; disable for read-only media
    pub lock: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { lock: true }
    }
}

/// On-disk form of one table
#[derive(Debug, Serialize, Deserialize)]
struct TableFile {
    schema: SchemaSpec,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

/// Exclusive marker file, removed on drop
#[derive(Debug)]
struct LockFile {
    path: PathBuf,
}

impl LockFile {
    fn acquire(root: &Path) -> StoreResult<Self> {
        let path = root.join(LOCK_FILE);
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StoreError::Locked(root.display().to_string()),
                _ => StoreError::Io(format!("Failed to create {}: {}", path.display(), e)),
            })?;

        Ok(Self { path })
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            let path = self.path.display().to_string();
            let reason = e.to_string();
            Logger::warn(
                "STORE_UNLOCK_FAILED",
                &[("path", path.as_str()), ("reason", reason.as_str())],
            );
        }
    }
}

/// A local store rooted at a directory
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    lock: Option<LockFile>,
}

impl FileStore {
    /// Opens an existing store directory, taking the lock.
    pub fn open(root: &Path) -> StoreResult<Self> {
        Self::open_with(root, &StoreOptions::default())
    }

    pub fn open_with(root: &Path, options: &StoreOptions) -> StoreResult<Self> {
        if !root.is_dir() {
            return Err(StoreError::Io(format!(
                "Store directory not found: {}",
                root.display()
            )));
        }

        let lock = if options.lock {
            Some(LockFile::acquire(root)?)
        } else {
            None
        };

        let path = root.display().to_string();
        log_event_with_fields(
            Event::StoreOpened,
            &[("locked", bool_str(lock.is_some())), ("path", path.as_str())],
        );

        Ok(Self {
            root: root.to_path_buf(),
            lock,
        })
    }

    /// Creates the store directory if needed and opens it.
    pub fn create(root: &Path) -> StoreResult<Self> {
        fs::create_dir_all(root).map_err(|e| {
            StoreError::Io(format!("Failed to create {}: {}", root.display(), e))
        })?;
        Self::open(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    /// Writes a new table file. Fails if a table of that name exists.
    pub fn create_table(&self, schema: &SchemaDescriptor, rows: &[Record]) -> StoreResult<()> {
        if !is_file_safe_name(schema.name()) {
            return Err(StoreError::InvalidName(schema.name().to_string()));
        }
        schema
            .validate_structure()
            .map_err(|e| StoreError::malformed(schema.name(), e))?;

        if self.find_table_file(schema.name())?.is_some() {
            return Err(StoreError::TableAlreadyExists(schema.name().to_string()));
        }

        let file = TableFile {
            schema: SchemaSpec::from(schema.clone()),
            rows: rows.iter().map(|r| r.values().to_vec()).collect(),
        };
        let content = serde_json::to_string_pretty(&file)
            .map_err(|e| StoreError::malformed(schema.name(), e))?;

        let path = self
            .root
            .join(format!("{}.{}", schema.name(), TABLE_EXTENSION));
        fs::write(&path, content)
            .map_err(|e| StoreError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }

    /// Finds `<name>.json` ignoring case
    fn find_table_file(&self, name: &str) -> StoreResult<Option<PathBuf>> {
        let wanted = fold_name(name);
        for (stem, path) in self.table_files()? {
            if fold_name(&stem) == wanted {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    fn table_files(&self) -> StoreResult<Vec<(String, PathBuf)>> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            StoreError::Io(format!("Failed to read {}: {}", self.root.display(), e))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| StoreError::Io(format!("Failed to read directory entry: {}", e)))?
                .path();
            if path.extension().map_or(true, |ext| ext != TABLE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                files.push((stem.to_string(), path.clone()));
            }
        }
        files.sort();
        Ok(files)
    }

    fn load_table(path: &Path, name: &str) -> StoreResult<TableData> {
        let content = fs::read_to_string(path)
            .map_err(|e| StoreError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let file: TableFile =
            serde_json::from_str(&content).map_err(|e| StoreError::malformed(name, e))?;

        let schema = SchemaDescriptor::from(file.schema);
        schema
            .validate_structure()
            .map_err(|e| StoreError::malformed(name, e))?;

        let schema = Arc::new(schema);
        let mut data = TableData::new(Arc::clone(&schema));
        for (i, values) in file.rows.into_iter().enumerate() {
            let record = Record::new(&schema, values)
                .map_err(|e| StoreError::malformed(name, format!("row {}: {}", i, e)))?;
            data.push(record);
        }
        Ok(data)
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        // Release the lock before logging the close
        drop(self.lock.take());
        let path = self.root.display().to_string();
        log_event_with_fields(Event::StoreClosed, &[("path", path.as_str())]);
    }
}

/// Table loaded from a [`FileStore`]; cannot outlive the store
#[derive(Debug)]
pub struct FileTable<'s> {
    data: TableData,
    _store: PhantomData<&'s FileStore>,
}

impl TabularStore for FileStore {
    type Table<'s> = FileTable<'s>;

    fn open_table(&self, name: &str) -> StoreResult<FileTable<'_>> {
        let path = self
            .find_table_file(name)?
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))?;

        let data = Self::load_table(&path, name)?;
        let rows = data.row_count().to_string();
        log_event_with_fields(
            Event::TableOpened,
            &[("rows", rows.as_str()), ("table", data.schema().name())],
        );

        Ok(FileTable {
            data,
            _store: PhantomData,
        })
    }

    fn table_names(&self) -> StoreResult<Vec<String>> {
        let files = self.table_files()?;
        Ok(files.into_iter().map(|(stem, _)| stem).collect())
    }
}

impl<'s> Table for FileTable<'s> {
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

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, FieldType};
    use crate::store::Cursor;
    use serde_json::json;
    use tempfile::TempDir;

    fn schema() -> SchemaDescriptor {
        SchemaDescriptor::new(
            "luCodeInspection",
            vec![
                FieldSpec::object_id("OBJECTID"),
                FieldSpec::new("ACTION", FieldType::String),
            ],
        )
    }

    #[test]
    fn test_lock_released_on_drop() {
        let temp_dir = TempDir::new().unwrap();
        let lock_path = temp_dir.path().join(LOCK_FILE);

        {
            let store = FileStore::open(temp_dir.path()).unwrap();
            assert!(store.is_locked());
            assert!(lock_path.exists());
            assert!(fs::read(&lock_path).unwrap().is_empty());

            let err = FileStore::open(temp_dir.path()).unwrap_err();
            assert_eq!(err.code(), "ROWFIELD_STORE_LOCKED");
        }

        assert!(!lock_path.exists());
        assert!(FileStore::open(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_unlocked_open() {
        let temp_dir = TempDir::new().unwrap();
        let _held = FileStore::open(temp_dir.path()).unwrap();

        let reader = FileStore::open_with(temp_dir.path(), &StoreOptions { lock: false }).unwrap();
        assert!(!reader.is_locked());
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let err = FileStore::open(&temp_dir.path().join("absent.gdb")).unwrap_err();
        assert_eq!(err.code(), "ROWFIELD_STORE_IO");
    }

    #[test]
    fn test_create_and_open_table() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::create(&temp_dir.path().join("LocalGovernment.gdb")).unwrap();
        let schema = schema();
        let rows = vec![Record::new(&schema, vec![json!(1), json!("1st Notice")]).unwrap()];
        store.create_table(&schema, &rows).unwrap();

        assert_eq!(store.table_names().unwrap(), vec!["luCodeInspection"]);

        let table = store.open_table("LUCODEINSPECTION").unwrap();
        assert_eq!(table.schema().find_field("action"), 1);

        let mut cursor = table.search(&QueryFilter::all()).unwrap();
        assert!(cursor.move_next().unwrap());
        assert_eq!(cursor.current().unwrap().get(1), Some(&json!("1st Notice")));
        assert!(!cursor.move_next().unwrap());
    }

    #[test]
    fn test_duplicate_table_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        store.create_table(&schema(), &[]).unwrap();

        let err = store.create_table(&schema(), &[]).unwrap_err();
        assert_eq!(err.code(), "ROWFIELD_TABLE_EXISTS");
    }

    #[test]
    fn test_malformed_row_reports_index() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("broken.json"),
            r#"{"schema": {"name": "broken", "fields": [{"name": "OBJECTID", "type": "objectid", "role": "objectid", "nullable": false}]},
                "rows": [[1], ["two"]]}"#,
        )
        .unwrap();

        let store = FileStore::open(temp_dir.path()).unwrap();
        let err = store.open_table("broken").unwrap_err();
        assert_eq!(err.code(), "ROWFIELD_MALFORMED_TABLE");
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_table_name_cannot_escape_root() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::create(&temp_dir.path().join("gdb")).unwrap();

        for name in ["../escaped", "nested/table", ".hidden", ""] {
            let schema = SchemaDescriptor::new(name, vec![FieldSpec::object_id("OBJECTID")]);
            let err = store.create_table(&schema, &[]).unwrap_err();
            assert_eq!(err, StoreError::InvalidName(name.to_string()));
            assert_eq!(err.code(), "ROWFIELD_INVALID_TABLE_NAME");
        }

        assert!(!temp_dir.path().join("escaped.json").exists());
        assert!(store.table_names().unwrap().is_empty());
    }

    #[test]
    fn test_table_names_reports_unreadable_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("gdb");
        fs::create_dir(&root).unwrap();

        let store = FileStore::open_with(&root, &StoreOptions { lock: false }).unwrap();
        fs::remove_dir(&root).unwrap();

        let err = store.table_names().unwrap_err();
        assert_eq!(err.code(), "ROWFIELD_STORE_IO");
    }

    #[test]
    fn test_missing_table() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();

        let err = store.open_table("LandUseCase").unwrap_err();
        assert_eq!(err, StoreError::TableNotFound("LandUseCase".into()));
    }
}
