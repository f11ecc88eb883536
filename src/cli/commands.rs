//! CLI command implementations
//!
//! Each command loads the configuration, opens the store, does its work
//! inside an [`ObservationScope`] and writes one JSON document to stdout.
//! The store (and its lock file) is released before the command returns.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::cursor::search;
use crate::observability::{log_event_with_fields, Event, Logger, ObservationScope, Severity};
use crate::record::Record;
use crate::schema::SchemaLoader;
use crate::store::{FileStore, QueryFilter, StoreOptions, Table, TabularStore};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Store directory (required)
    pub data_dir: String,

    /// Minimum log severity: trace, info, warn or error (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Take the store lock file (default true)
    #[serde(default = "default_lock")]
    pub lock: bool,

    /// Directory holding `<table>.schema.json` files (default `<data_dir>/schemas`)
    #[serde(default)]
    pub schema_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_lock() -> bool {
    true
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        self.severity()?;

        if let Some(dir) = &self.schema_dir {
            if dir.trim().is_empty() {
                return Err(CliError::config_error("schema_dir must not be empty when set"));
            }
        }

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level.parse::<Severity>().map_err(|_| {
            CliError::config_error(format!(
                "Invalid log_level: '{}'. Must be one of trace, info, warn, error.",
                self.log_level
            ))
        })
    }

    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn schema_path(&self) -> PathBuf {
        match &self.schema_dir {
            Some(dir) => PathBuf::from(dir),
            None => self.data_path().join("schemas"),
        }
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions { lock: self.lock }
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Fields { config, table } => fields(&config, &table),
        Command::FindField {
            config,
            table,
            where_clause,
            names,
        } => find_field(&config, &table, where_clause.as_deref(), &names),
        Command::CreateTable {
            config,
            table,
            rows,
        } => create_table(&config, &table, rows.as_deref()),
    }
}

/// Loads the config and applies its log level.
fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);
    // stdout carries the response envelope only
    Logger::set_stderr_sink(true);

    let path = config_path.display().to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("data_dir", config.data_dir.as_str()), ("path", path.as_str())],
    );
    Ok(config)
}

/// Runs `work` inside a scope named `name`, logging its outcome.
fn observed<T>(
    name: &str,
    table: &str,
    work: impl FnOnce() -> CliResult<T>,
) -> CliResult<T> {
    let scope = ObservationScope::with_fields(name, &[("table", table)]);
    match work() {
        Ok(value) => {
            scope.complete();
            Ok(value)
        }
        Err(e) => {
            scope.fail(e.code_str(), e.message());
            Err(e)
        }
    }
}

/// Print a table's fields and role-bound names
pub fn fields(config_path: &Path, table: &str) -> CliResult<()> {
    let config = load_config(config_path)?;
    let output = observed("FIELDS", table, || {
        let store = FileStore::open_with(config.data_path(), &config.store_options())?;
        describe_table(&store, table)
    })?;
    write_response(output)
}

/// Resolve `names` against the first row matching `where_clause`
pub fn find_field(
    config_path: &Path,
    table: &str,
    where_clause: Option<&str>,
    names: &[String],
) -> CliResult<()> {
    let config = load_config(config_path)?;
    let output = observed("FIND_FIELD", table, || {
        let store = FileStore::open_with(config.data_path(), &config.store_options())?;
        find_fields(&store, table, where_clause, names)
    })?;
    write_response(output)
}

/// Create `table` from its schema file, optionally seeding rows
pub fn create_table(config_path: &Path, table: &str, rows_path: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let output = observed("CREATE_TABLE", table, || {
        let mut loader = SchemaLoader::new(&config.schema_path());
        loader.load_all()?;
        let count = loader.schema_count().to_string();
        let dir = loader.schema_dir().display().to_string();
        log_event_with_fields(
            Event::SchemasLoaded,
            &[("count", count.as_str()), ("dir", dir.as_str())],
        );

        let rows = match rows_path {
            Some(path) => read_rows(path)?,
            None => Vec::new(),
        };

        let store = FileStore::open_with(config.data_path(), &config.store_options())?;
        create_from_loader(&store, &loader, table, &rows)
    })?;
    write_response(output)
}

/// Schema of `table` as JSON
pub fn describe_table(store: &FileStore, table: &str) -> CliResult<Value> {
    let table = store.open_table(table)?;
    let schema = table.schema();

    Ok(json!({
        "table": schema.name(),
        "object_id_field": schema.object_id_field_name(),
        "subtype_field": schema.subtype_field_name(),
        "shape_field": schema.shape_field_name(),
        "fields": schema.fields(),
    }))
}

/// Ordinals of `names` on the first row matching `where_clause`.
///
/// Names the table does not have resolve to `-1`.
pub fn find_fields(
    store: &FileStore,
    table: &str,
    where_clause: Option<&str>,
    names: &[String],
) -> CliResult<Value> {
    let table = store.open_table(table)?;
    let filter = match where_clause {
        Some(clause) => QueryFilter::with_where(clause),
        None => QueryFilter::all(),
    };

    let mut cursor = search(&table, &filter)?;
    if !cursor.move_next()? {
        return Err(CliError::no_rows(table.name()));
    }

    let row = cursor.current()?;
    let resolved: Vec<Value> = names
        .iter()
        .map(|name| json!({ "name": name, "ordinal": row.find_field(name.as_str()) }))
        .collect();

    Ok(json!({
        "table": table.name(),
        "object_id": row.object_id(),
        "fields": resolved,
    }))
}

/// Writes `table` to the store using the loader's schema for it
pub fn create_from_loader(
    store: &FileStore,
    loader: &SchemaLoader,
    table: &str,
    rows: &[Value],
) -> CliResult<Value> {
    let schema = loader.require(table)?;
    let records = rows
        .iter()
        .map(|row| Record::from_named(&schema, row))
        .collect::<Result<Vec<_>, _>>()?;

    store.create_table(&schema, &records)?;

    Ok(json!({
        "table": schema.name(),
        "created": true,
        "rows": records.len(),
    }))
}

fn read_rows(path: &Path) -> CliResult<Vec<Value>> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::io_error(format!("Failed to read rows file {}: {}", path.display(), e))
    })?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Array(rows) => Ok(rows),
        _ => Err(CliError::io_error(format!(
            "Rows file {} must hold a JSON array",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, FieldType, SchemaDescriptor};
    use tempfile::TempDir;

    fn inspection_schema() -> SchemaDescriptor {
        SchemaDescriptor::new(
            "luCodeInspection",
            vec![
                FieldSpec::object_id("OBJECTID"),
                FieldSpec::new("INSPECTID", FieldType::Integer),
                FieldSpec::new("ACTION", FieldType::String),
                FieldSpec::new("WorkKey", FieldType::Integer),
            ],
        )
    }

    fn seeded_store(dir: &TempDir) -> FileStore {
        let schema = inspection_schema();
        let rows = vec![
            Record::new(&schema, vec![json!(1), json!(501), json!("Closed"), json!(7)]).unwrap(),
            Record::new(&schema, vec![json!(2), json!(502), json!("1st Notice"), json!(8)]).unwrap(),
        ];
        let store = FileStore::open(dir.path()).unwrap();
        store.create_table(&schema, &rows).unwrap();
        store
    }

    fn write_config(dir: &TempDir, body: Value) -> PathBuf {
        let path = dir.path().join("rowfield.json");
        fs::write(&path, body.to_string()).unwrap();
        path
    }

    #[test]
    fn test_config_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, json!({"data_dir": "/srv/gis"}));

        let config = Config::load(&path).unwrap();
        assert_eq!(config.log_level, "info");
        assert!(config.lock);
        assert_eq!(config.schema_path(), PathBuf::from("/srv/gis/schemas"));
        assert_eq!(config.store_options(), StoreOptions { lock: true });
    }

    #[test]
    fn test_config_rejects_bad_log_level() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, json!({"data_dir": "/srv/gis", "log_level": "verbose"}));

        let err = Config::load(&path).unwrap_err();
        assert_eq!(err.code_str(), "ROWFIELD_CLI_CONFIG_ERROR");
        assert!(err.message().contains("verbose"));
    }

    #[test]
    fn test_config_requires_data_dir() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, json!({"lock": false}));
        assert!(Config::load(&path).is_err());

        let path = write_config(&dir, json!({"data_dir": "  "}));
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_config_missing_file() {
        let err = Config::load(Path::new("/nonexistent/rowfield.json")).unwrap_err();
        assert_eq!(err.code_str(), "ROWFIELD_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_describe_table() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);

        let output = describe_table(&store, "LUCODEINSPECTION").unwrap();
        assert_eq!(output["table"], "luCodeInspection");
        assert_eq!(output["object_id_field"], "OBJECTID");
        assert_eq!(output["subtype_field"], "");
        assert_eq!(output["fields"][2]["name"], "ACTION");
        assert_eq!(output["fields"][2]["ordinal"], 2);
        assert_eq!(output["fields"][2]["type"], "string");
    }

    #[test]
    fn test_find_fields_on_filtered_row() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let names = vec!["inspectid".to_string(), "violatekey".to_string()];

        let output =
            find_fields(&store, "luCodeInspection", Some("ACTION = '1st Notice'"), &names).unwrap();
        assert_eq!(output["object_id"], 2);
        assert_eq!(output["fields"][0]["ordinal"], 1);
        assert_eq!(output["fields"][1]["ordinal"], -1);
    }

    #[test]
    fn test_find_fields_no_rows() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);

        let err = find_fields(&store, "luCodeInspection", Some("WorkKey > 100"), &["ACTION".to_string()])
            .unwrap_err();
        assert_eq!(err.code_str(), "ROWFIELD_CLI_NO_ROWS");
    }

    #[test]
    fn test_find_fields_bad_query_is_not_sentinel() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);

        let err = find_fields(&store, "luCodeInspection", Some("NOPE = 1"), &["ACTION".to_string()])
            .unwrap_err();
        assert_eq!(err.code_str(), "ROWFIELD_INVALID_QUERY");
    }

    #[test]
    fn test_create_from_loader() {
        let dir = TempDir::new().unwrap();
        let schema_dir = dir.path().join("schemas");
        fs::create_dir_all(&schema_dir).unwrap();

        let mut loader = SchemaLoader::new(&schema_dir);
        loader.save_schema(&inspection_schema()).unwrap();
        loader.load_all().unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        let rows = vec![json!({"objectid": 10, "InspectId": 900, "action": "Closed"})];
        let output = create_from_loader(&store, &loader, "luCodeInspection", &rows).unwrap();
        assert_eq!(output["rows"], 1);

        let described = describe_table(&store, "luCodeInspection").unwrap();
        assert_eq!(described["fields"].as_array().unwrap().len(), 4);

        let again = create_from_loader(&store, &loader, "luCodeInspection", &[]).unwrap_err();
        assert_eq!(again.code_str(), "ROWFIELD_TABLE_EXISTS");
    }

    #[test]
    fn test_create_from_loader_unknown_schema() {
        let dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(&dir.path().join("schemas"));
        let store = FileStore::open(dir.path()).unwrap();

        let err = create_from_loader(&store, &loader, "Parcels", &[]).unwrap_err();
        assert_eq!(err.code_str(), "ROWFIELD_UNKNOWN_SCHEMA");
    }
}
