//! oem-minimize - schema-driven compaction of metadata records
//!
//! Field names of structured records are replaced by small key codes taken
//! from a tree of per-scope schema definitions, and restored on the way
//! back. Compact data written under an older schema stays readable as
//! long as the schema only grows.
//!
//! ```ignore
//! use oem_minimize::{maximize, minimize, protocol};
//!
//! let tree = protocol::show()?;
//! let (version, compact) = minimize(&record, tree)?;
//! let restored = maximize(version, &compact, tree).into_record();
//! ```

pub mod cli;
pub mod container;
pub mod minimize;
pub mod observability;
pub mod protocol;
pub mod schema;

pub use minimize::{
    maximize, minimize, CompactDocument, CompactRecord, CompactValue, Maximized, StructuredRecord,
};
pub use schema::{KeyCode, SchemaBuilder, SchemaDefinition, SchemaError, SchemaTree, SchemaVersion};
