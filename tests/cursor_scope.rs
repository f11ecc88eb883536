//! Cursor Scope Tests
//!
//! Consuming a search through RowCursor:
//! - Empty results end on the first move_next
//! - Each successful step exposes exactly one accessor
//! - Exhaustion is terminal
//! - Store failures stay errors and never turn into -1

use std::ops::ControlFlow;

use rowfield::cursor::{search, CursorError, CursorState};
use rowfield::schema::{FieldSpec, FieldType, SchemaDescriptor, FIELD_NOT_FOUND};
use rowfield::store::{MemoryStore, QueryFilter, StoreError, TabularStore};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn inspection_store(rows: usize) -> MemoryStore {
    let mut store = MemoryStore::new();
    store
        .create_table(SchemaDescriptor::new(
            "luCodeInspection",
            vec![
                FieldSpec::object_id("OBJECTID"),
                FieldSpec::new("INSPECTID", FieldType::Integer),
                FieldSpec::new("ACTION", FieldType::String),
                FieldSpec::new("WorkKey", FieldType::Integer),
            ],
        ))
        .unwrap();

    for i in 0..rows {
        store
            .insert(
                "luCodeInspection",
                vec![json!(i + 1), json!(700 + i), json!("1st Notice"), json!(i * 10)],
            )
            .unwrap();
    }
    store
        .insert(
            "luCodeInspection",
            vec![json!(rows + 1), json!(999), json!("Closed"), json!(null)],
        )
        .unwrap();
    store
}

fn notices() -> QueryFilter {
    QueryFilter::with_where("ACTION = '1st Notice'")
}

// =============================================================================
// Cursor Lifecycle
// =============================================================================

#[test]
fn test_zero_rows() {
    let store = inspection_store(0);
    let table = store.open_table("luCodeInspection").unwrap();
    let mut cursor = search(&table, &notices()).unwrap();

    assert!(!cursor.move_next().unwrap());

    let err = cursor.current().unwrap_err();
    assert!(err.is_usage_error());
    assert_eq!(err, CursorError::NoCurrentRow(CursorState::Exhausted));
}

#[test]
fn test_two_rows() {
    let store = inspection_store(2);
    let table = store.open_table("luCodeInspection").unwrap();
    let mut cursor = search(&table, &notices()).unwrap();

    let mut steps = Vec::new();
    let mut object_ids = Vec::new();
    loop {
        let advanced = cursor.move_next().unwrap();
        steps.push(advanced);
        if !advanced {
            break;
        }

        let row = cursor.current().unwrap();
        let first_name = row.get_fields()[0].name.as_str();
        assert_eq!(row.find_field(first_name), 0);
        assert_eq!(row.find_field("INSPECTID"), 1);
        assert_eq!(row.find_field("violatekey"), FIELD_NOT_FOUND);
        assert_eq!(row.find_field("WorkKey"), 3);
        assert_eq!(row.find_field(row.schema().subtype_field_name()), FIELD_NOT_FOUND);
        assert_eq!(row.find_field(row.schema().object_id_field_name()), 0);
        assert_eq!(row.get_str("action"), Some("1st Notice"));
        object_ids.push(row.object_id().unwrap());
    }

    assert_eq!(steps, vec![true, true, false]);
    assert_eq!(object_ids, vec![1, 2]);
    assert_eq!(cursor.rows_read(), 2);
}

#[test]
fn test_exhausted_stays_exhausted() {
    let store = inspection_store(1);
    let table = store.open_table("luCodeInspection").unwrap();
    let mut cursor = search(&table, &notices()).unwrap();

    assert!(cursor.move_next().unwrap());
    assert!(!cursor.move_next().unwrap());
    for _ in 0..3 {
        assert!(!cursor.move_next().unwrap());
        assert_eq!(cursor.state(), CursorState::Exhausted);
    }
}

#[test]
fn test_unfiltered_search_sees_every_row() {
    let store = inspection_store(3);
    let table = store.open_table("LUCODEINSPECTION").unwrap();
    let mut cursor = search(&table, &QueryFilter::all()).unwrap();

    let visited = cursor.for_each_row(|_| ControlFlow::Continue(())).unwrap();
    assert_eq!(visited, 4);
}

#[test]
fn test_null_never_matches_ordering() {
    let store = inspection_store(2);
    let table = store.open_table("luCodeInspection").unwrap();

    let mut cursor = search(&table, &QueryFilter::with_where("WorkKey >= 0")).unwrap();
    assert_eq!(cursor.for_each_row(|_| ControlFlow::Continue(())).unwrap(), 2);

    let mut cursor = search(&table, &QueryFilter::with_where("WorkKey IS NULL")).unwrap();
    let mut actions = Vec::new();
    cursor
        .for_each_row(|row| {
            actions.push(row.get_str("ACTION").unwrap_or_default().to_string());
            ControlFlow::Continue(())
        })
        .unwrap();
    assert_eq!(actions, vec!["Closed"]);
}

// =============================================================================
// Store Errors vs Not Found
// =============================================================================

#[test]
fn test_unknown_filter_field_is_store_error() {
    let store = inspection_store(1);
    let table = store.open_table("luCodeInspection").unwrap();

    let err = search(&table, &QueryFilter::with_where("violatekey = 1")).unwrap_err();
    assert!(!err.is_usage_error());
    assert!(matches!(err, CursorError::Store(StoreError::InvalidQuery(_))));
}

#[test]
fn test_missing_table_is_store_error() {
    let store = inspection_store(1);
    let err = store.open_table("Parcels").unwrap_err();
    assert_eq!(err, StoreError::TableNotFound("Parcels".to_string()));
}
