//! Schema subsystem
//!
//! Scopes map field names to small integer key codes. Scopes are composed
//! into an immutable `SchemaTree` through `SchemaBuilder`, and the tree is
//! the `KeyCodec` used by the minimizer and maximizer.
//!
//! # Design Principles
//!
//! - Key codes are unique within a scope and never reassigned
//! - Trees are validated once and never mutated afterwards
//! - One root per tree, no mount cycles
//! - Declarations are data, not code

mod builder;
mod errors;
mod evolution;
mod loader;
mod tree;
mod types;

pub use builder::SchemaBuilder;
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity, ShapeDetails};
pub use evolution::verify_evolution;
pub use loader::{MountDeclaration, ProtocolDeclaration, SchemaLoader, ScopeDeclaration};
pub use tree::{KeyCodec, SchemaTree};
pub use types::{ChildMount, KeyCode, MountOptions, SchemaDefinition, SchemaVersion, ScopeId};
