//! Observable events
//!
//! Events are explicit and typed. Field resolution itself emits nothing;
//! only handle lifecycle and query activity are logged.

use std::fmt;

/// Observable events in rowfield
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,
    /// Schema files loaded
    SchemasLoaded,

    // Store handles
    /// Datastore opened
    StoreOpened,
    /// Datastore released
    StoreClosed,
    /// Table opened and its schema snapshot taken
    TableOpened,

    // Queries
    /// Search issued against a table
    SearchStart,
    /// Search rejected by the store
    SearchRejected,
    /// Cursor released
    CursorClosed,

    /// Store failed while a handle was in use
    StoreFailure,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",

            Event::StoreOpened => "STORE_OPENED",
            Event::StoreClosed => "STORE_CLOSED",
            Event::TableOpened => "TABLE_OPENED",

            Event::SearchStart => "SEARCH_BEGIN",
            Event::SearchRejected => "SEARCH_REJECTED",
            Event::CursorClosed => "CURSOR_CLOSED",

            Event::StoreFailure => "STORE_FAILURE",
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::SearchRejected | Event::StoreFailure)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
