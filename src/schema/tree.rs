//! Finalized schema tree and scope-qualified key lookup
//!
//! A `SchemaTree` is immutable once built. It holds every scope reachable
//! from the root in an arena, addressed by `ScopeId`, so a child scope
//! mounted under several parents is stored once.

use std::collections::{BTreeMap, HashMap};

use serde_json::{json, Value};

use super::errors::{SchemaError, SchemaResult};
use super::types::{ChildMount, KeyCode, SchemaDefinition, SchemaVersion, ScopeId};

/// Bidirectional field name / key code lookup within one scope.
pub trait KeyCodec {
    /// Returns the key code of `field` in `scope`.
    ///
    /// # Errors
    ///
    /// Returns `OEM_UNKNOWN_FIELD` if the field is not declared in the scope.
    fn encode_key(&self, scope: ScopeId, field: &str) -> SchemaResult<KeyCode>;

    /// Returns the field name of `code` in `scope`, or `None` when the code
    /// is not recognized (data written by a newer schema).
    fn decode_key(&self, scope: ScopeId, code: KeyCode) -> Option<&str>;
}

/// One scope of a finalized tree
#[derive(Debug, Clone)]
pub(crate) struct ScopeNode {
    pub(crate) definition: SchemaDefinition,
    pub(crate) by_code: HashMap<KeyCode, String>,
    pub(crate) mounts: BTreeMap<String, ChildMount>,
}

impl ScopeNode {
    pub(crate) fn new(definition: SchemaDefinition) -> Self {
        let by_code = definition
            .fields
            .iter()
            .map(|(name, code)| (*code, name.clone()))
            .collect();
        Self {
            definition,
            by_code,
            mounts: BTreeMap::new(),
        }
    }
}

/// Immutable, validated hierarchy of scopes rooted at one document scope.
#[derive(Debug, Clone)]
pub struct SchemaTree {
    scopes: Vec<ScopeNode>,
    names: HashMap<String, ScopeId>,
    root: ScopeId,
    version: SchemaVersion,
}

impl SchemaTree {
    pub(crate) fn from_parts(
        scopes: Vec<ScopeNode>,
        names: HashMap<String, ScopeId>,
        root: ScopeId,
        version: SchemaVersion,
    ) -> Self {
        Self {
            scopes,
            names,
            root,
            version,
        }
    }

    /// Root scope of the tree
    pub fn root(&self) -> ScopeId {
        self.root
    }

    /// Name of the root scope
    pub fn name(&self) -> &str {
        &self.scopes[self.root.0].definition.scope_name
    }

    /// Version attached to every document minimized with this tree
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// Number of scopes in the tree
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Looks up a scope by name
    pub fn scope_id(&self, scope_name: &str) -> Option<ScopeId> {
        self.names.get(scope_name).copied()
    }

    /// Returns the declaration of a scope
    pub fn definition(&self, scope: ScopeId) -> Option<&SchemaDefinition> {
        self.scopes.get(scope.0).map(|node| &node.definition)
    }

    /// Iterates over all scope declarations
    pub fn definitions(&self) -> impl Iterator<Item = &SchemaDefinition> {
        self.scopes.iter().map(|node| &node.definition)
    }

    /// Mounts declared on a scope, by field name
    pub fn mounts(&self, scope: ScopeId) -> impl Iterator<Item = (&str, &ChildMount)> {
        self.scopes
            .get(scope.0)
            .into_iter()
            .flat_map(|node| node.mounts.iter().map(|(name, mount)| (name.as_str(), mount)))
    }

    /// Returns the mount of `field` in `scope`, or `None` for plain fields.
    pub fn child_mount(&self, scope: ScopeId, field: &str) -> Option<&ChildMount> {
        self.scopes.get(scope.0)?.mounts.get(field)
    }

    /// Name of a scope, for diagnostics
    pub fn scope_name(&self, scope: ScopeId) -> &str {
        self.scopes
            .get(scope.0)
            .map(|node| node.definition.scope_name.as_str())
            .unwrap_or("<unknown>")
    }

    /// Describes the tree as JSON: scopes with their key tables and mounts.
    pub fn describe(&self) -> Value {
        let scopes: Vec<Value> = self
            .scopes
            .iter()
            .map(|node| {
                let fields: serde_json::Map<String, Value> = node
                    .definition
                    .fields
                    .iter()
                    .map(|(name, code)| (name.clone(), json!(format!("{:#04x}", code))))
                    .collect();
                let mounts: serde_json::Map<String, Value> = node
                    .mounts
                    .iter()
                    .map(|(name, mount)| {
                        (
                            name.clone(),
                            json!({
                                "child": self.scope_name(mount.child),
                                "repeated": mount.is_repeated(),
                            }),
                        )
                    })
                    .collect();
                json!({
                    "scope": node.definition.scope_name,
                    "fields": fields,
                    "mounts": mounts,
                })
            })
            .collect();

        json!({
            "root": self.name(),
            "version": self.version,
            "scopes": scopes,
        })
    }

    fn node(&self, scope: ScopeId) -> SchemaResult<&ScopeNode> {
        self.scopes
            .get(scope.0)
            .ok_or_else(|| SchemaError::unknown_scope(&format!("#{}", scope.0)))
    }
}

impl KeyCodec for SchemaTree {
    fn encode_key(&self, scope: ScopeId, field: &str) -> SchemaResult<KeyCode> {
        let node = self.node(scope)?;
        node.definition
            .key_of(field)
            .ok_or_else(|| SchemaError::unknown_field(&node.definition.scope_name, field))
    }

    fn decode_key(&self, scope: ScopeId, code: KeyCode) -> Option<&str> {
        self.scopes
            .get(scope.0)
            .and_then(|node| node.by_code.get(&code))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{MountOptions, SchemaBuilder, SchemaErrorCode};

    fn show_tree() -> SchemaTree {
        let mut builder = SchemaBuilder::new();
        builder
            .define(
                "show",
                true,
                Some(0x01),
                [("identifiers", 0x01), ("names", 0x02), ("seasons", 0x21)],
            )
            .unwrap();
        builder
            .define("show.identifiers", false, None, [("imdb", 0x02), ("tvdb", 0x03)])
            .unwrap();
        builder
            .define("season", false, None, [("identifiers", 0x01)])
            .unwrap();
        builder
            .mount("show", "identifiers", "show.identifiers", MountOptions::single())
            .unwrap();
        builder
            .mount("show", "seasons", "season", MountOptions::repeated())
            .unwrap();
        builder
            .mount("season", "identifiers", "show.identifiers", MountOptions::single())
            .unwrap();
        builder.finalize().unwrap()
    }

    #[test]
    fn test_encode_decode_key() {
        let tree = show_tree();
        let root = tree.root();
        assert_eq!(tree.encode_key(root, "names").unwrap(), 0x02);
        assert_eq!(tree.decode_key(root, 0x21), Some("seasons"));
        assert_eq!(tree.decode_key(root, 0x55), None);
    }

    #[test]
    fn test_encode_unknown_field_is_error() {
        let tree = show_tree();
        let err = tree.encode_key(tree.root(), "title").unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::UnknownField);
        assert_eq!(err.scope(), Some("show"));
    }

    #[test]
    fn test_key_is_scope_qualified() {
        let tree = show_tree();
        let ids = tree.scope_id("show.identifiers").unwrap();
        assert_eq!(tree.decode_key(ids, 0x02), Some("imdb"));
        assert_eq!(tree.decode_key(tree.root(), 0x02), Some("names"));
    }

    #[test]
    fn test_shared_child_stored_once() {
        let tree = show_tree();
        assert_eq!(tree.scope_count(), 3);

        let season = tree.scope_id("season").unwrap();
        let ids = tree.scope_id("show.identifiers").unwrap();
        let from_root = tree.child_mount(tree.root(), "identifiers").unwrap();
        let from_season = tree.child_mount(season, "identifiers").unwrap();
        assert_eq!(from_root.child, ids);
        assert_eq!(from_season.child, ids);
    }

    #[test]
    fn test_child_mount_lookup() {
        let tree = show_tree();
        let seasons = tree.child_mount(tree.root(), "seasons").unwrap();
        assert_eq!(seasons.key, 0x21);
        assert!(seasons.is_repeated());
        assert!(tree.child_mount(tree.root(), "names").is_none());
        assert!(tree.child_mount(tree.root(), "missing").is_none());
    }

    #[test]
    fn test_describe() {
        let tree = show_tree();
        let description = tree.describe();
        assert_eq!(description["root"], "show");
        assert_eq!(description["version"], 1);
        assert_eq!(description["scopes"][0]["fields"]["seasons"], "0x21");
        assert_eq!(description["scopes"][0]["mounts"]["seasons"]["repeated"], true);
    }
}
