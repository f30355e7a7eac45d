//! Observability subsystem
//!
//! Structured JSON logging of typed events.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on encoding or decoding
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use oem_minimize::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::ShapeMismatch, &[("path", "seasons")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{min_severity, set_min_severity, Logger, Severity};

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
