//! Schema type definitions
//!
//! A scope is one field namespace: field names mapped to small integer key
//! codes. Scopes are linked into a tree by child mounts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key code assigned to a field within one scope
pub type KeyCode = u16;

/// Version carried in the header of a root document
pub type SchemaVersion = u32;

/// Index of a scope inside a finalized `SchemaTree`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub(crate) usize);

impl ScopeId {
    /// Raw arena index
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Immutable declaration of one scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Unique scope name within a tree
    pub scope_name: String,
    /// Document version, present only on root scopes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<SchemaVersion>,
    /// Whether this scope can be a document root
    #[serde(default)]
    pub is_root: bool,
    /// Field name to key code
    pub fields: BTreeMap<String, KeyCode>,
}

impl SchemaDefinition {
    /// Returns the key code declared for `field`
    pub fn key_of(&self, field: &str) -> Option<KeyCode> {
        self.fields.get(field).copied()
    }

    /// Returns the field name declared for `code`
    pub fn field_of(&self, code: KeyCode) -> Option<&str> {
        self.fields
            .iter()
            .find(|(_, c)| **c == code)
            .map(|(name, _)| name.as_str())
    }
}

/// Processing options of a mount
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountOptions {
    /// Field holds an ordered sequence of child records
    #[serde(default)]
    pub repeated: bool,
}

impl MountOptions {
    /// Field holds a single nested record
    pub fn single() -> Self {
        Self { repeated: false }
    }

    /// Field holds an ordered sequence of nested records
    pub fn repeated() -> Self {
        Self { repeated: true }
    }
}

/// Link from a parent field to a child scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildMount {
    /// Key code of the mounted field in the parent scope
    pub key: KeyCode,
    /// Child scope
    pub child: ScopeId,
    /// Processing options
    pub options: MountOptions,
}

impl ChildMount {
    /// Whether the field holds a sequence of records
    pub fn is_repeated(&self) -> bool {
        self.options.repeated
    }
}
