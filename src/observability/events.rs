//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events of schema construction and record coding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Startup
    /// Configuration loaded
    ConfigLoaded,
    /// Protocol registry populated
    ProtocolsLoaded,
    /// A schema tree passed validation
    SchemaTreeFinalized,

    // Decoding
    /// Mounted field had the wrong shape and was dropped
    ShapeMismatch,
    /// Key code unknown to the reading schema was skipped
    UnknownKeySkipped,
    /// Document header is newer than the reading schema
    SchemaVersionAhead,
}

impl Event {
    /// Returns the event name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ProtocolsLoaded => "PROTOCOLS_LOADED",
            Event::SchemaTreeFinalized => "SCHEMA_TREE_FINALIZED",
            Event::ShapeMismatch => "SHAPE_MISMATCH",
            Event::UnknownKeySkipped => "UNKNOWN_KEY_SKIPPED",
            Event::SchemaVersionAhead => "SCHEMA_VERSION_AHEAD",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ShapeMismatch => Severity::Warn,
            Event::UnknownKeySkipped | Event::SchemaTreeFinalized => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::ShapeMismatch.as_str(), "SHAPE_MISMATCH");
        assert_eq!(Event::UnknownKeySkipped.as_str(), "UNKNOWN_KEY_SKIPPED");
        assert_eq!(format!("{}", Event::SchemaVersionAhead), "SCHEMA_VERSION_AHEAD");
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(Event::ShapeMismatch.severity(), Severity::Warn);
        assert_eq!(Event::UnknownKeySkipped.severity(), Severity::Trace);
        assert_eq!(Event::ProtocolsLoaded.severity(), Severity::Info);
    }
}
