//! Observability for rowfield
//!
//! Structured JSON logging and handle lifecycle events.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No async or background threads
//! 3. Deterministic output
//! 4. Field resolution is never logged
//!
//! # Usage
//!
//! ```ignore
//! use rowfield::observability::{Logger, Event, ObservationScope};
//!
//! Logger::info("TABLE_OPENED", &[("table", "luCodeInspection")]);
//!
//! let scope = ObservationScope::new("FIELDS");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};

fn severity_for(event: Event) -> Severity {
    if event.is_failure() {
        Severity::Error
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    match severity_for(event) {
        Severity::Error => Logger::error(event.as_str(), fields),
        severity => Logger::log(severity, event.as_str(), fields),
    }
}
