//! Protocol declarations and the protocol registry
//!
//! Declarations are plain JSON data, one protocol per file:
//!
//! ```json
//! {
//!   "name": "show",
//!   "scopes": [
//!     {"name": "show", "root": true, "version": 1, "fields": {"names": 2, "seasons": 33}},
//!     {"name": "season", "fields": {"names": 2}}
//!   ],
//!   "mounts": [
//!     {"parent": "show", "field": "seasons", "child": "season", "repeated": true}
//!   ]
//! }
//! ```
//!
//! - Every `*.json` file of a directory is one protocol
//! - Malformed files abort loading
//! - A protocol name can only be registered once

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::builder::SchemaBuilder;
use super::errors::{SchemaError, SchemaResult};
use super::tree::SchemaTree;
use super::types::{KeyCode, MountOptions, SchemaVersion};

/// One scope of a declaration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeDeclaration {
    pub name: String,
    #[serde(default)]
    pub root: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<SchemaVersion>,
    pub fields: BTreeMap<String, KeyCode>,
}

/// One mount of a declaration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountDeclaration {
    pub parent: String,
    pub field: String,
    pub child: String,
    #[serde(default)]
    pub repeated: bool,
}

/// A whole protocol as data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolDeclaration {
    pub name: String,
    pub scopes: Vec<ScopeDeclaration>,
    #[serde(default)]
    pub mounts: Vec<MountDeclaration>,
}

impl ProtocolDeclaration {
    /// Parses a declaration from JSON text.
    pub fn from_json(source: &str, origin: &str) -> SchemaResult<Self> {
        serde_json::from_str(source)
            .map_err(|e| SchemaError::malformed_declaration(origin, format!("Invalid JSON: {}", e)))
    }

    /// Reads and parses a declaration file.
    pub fn from_file(path: &Path) -> SchemaResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_declaration(
                path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;
        Self::from_json(&content, &path.display().to_string())
    }

    /// Runs the declaration through the builder.
    pub fn build(&self) -> SchemaResult<SchemaTree> {
        let mut builder = SchemaBuilder::new();
        for scope in &self.scopes {
            builder.define(
                &scope.name,
                scope.root,
                scope.version,
                scope.fields.iter().map(|(field, code)| (field.as_str(), *code)),
            )?;
        }
        for mount in &self.mounts {
            let options = MountOptions {
                repeated: mount.repeated,
            };
            builder.mount(&mount.parent, &mount.field, &mount.child, options)?;
        }
        builder.finalize()
    }
}

/// Registry of finalized protocol trees, by name.
#[derive(Debug, Default)]
pub struct SchemaLoader {
    protocols: BTreeMap<String, SchemaTree>,
}

impl SchemaLoader {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry seeded with the built-in protocols.
    pub fn with_builtin() -> SchemaResult<Self> {
        let mut loader = Self::new();
        for protocol in crate::protocol::Protocol::ALL {
            loader.register(protocol.name(), protocol.tree()?.clone())?;
        }
        Ok(loader)
    }

    /// Loads every `*.json` declaration in `dir`.
    ///
    /// Returns the number of protocols loaded. A missing directory loads
    /// nothing.
    pub fn load_dir(&mut self, dir: &Path) -> SchemaResult<usize> {
        if !dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(dir).map_err(|e| {
            SchemaError::malformed_declaration(
                dir.display().to_string(),
                format!("Failed to read directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_declaration(
                    dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();

            // Skip non-JSON files
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }

        // Directory order is not stable across platforms
        paths.sort();
        for path in &paths {
            self.load_file(path)?;
        }

        Ok(paths.len())
    }

    /// Loads one declaration file, returning the protocol name.
    pub fn load_file(&mut self, path: &Path) -> SchemaResult<String> {
        let declaration = ProtocolDeclaration::from_file(path)?;
        let tree = declaration.build()?;
        self.register(&declaration.name, tree)?;
        Ok(declaration.name)
    }

    /// Registers a tree under `name`.
    pub fn register(&mut self, name: &str, tree: SchemaTree) -> SchemaResult<()> {
        if self.protocols.contains_key(name) {
            return Err(SchemaError::protocol_exists(name));
        }
        self.protocols.insert(name.to_string(), tree);
        Ok(())
    }

    /// Gets a protocol tree by name.
    pub fn get(&self, name: &str) -> Option<&SchemaTree> {
        self.protocols.get(name)
    }

    /// Checks if a protocol exists.
    pub fn exists(&self, name: &str) -> bool {
        self.protocols.contains_key(name)
    }

    /// Registered protocol names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.protocols.keys().map(String::as_str)
    }

    /// Returns the number of registered protocols.
    pub fn protocol_count(&self) -> usize {
        self.protocols.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{KeyCodec, SchemaErrorCode};
    use tempfile::TempDir;

    const ANIME: &str = r#"{
        "name": "anime",
        "scopes": [
            {
                "name": "anime", "root": true, "version": 3,
                "fields": {"identifiers": 1, "names": 2, "episodes": 33}
            },
            {"name": "anime.identifiers", "fields": {"anidb": 1}},
            {"name": "episode", "fields": {"names": 2}}
        ],
        "mounts": [
            {"parent": "anime", "field": "identifiers", "child": "anime.identifiers"},
            {"parent": "anime", "field": "episodes", "child": "episode", "repeated": true}
        ]
    }"#;

    #[test]
    fn test_declaration_builds_tree() {
        let declaration = ProtocolDeclaration::from_json(ANIME, "<test>").unwrap();
        let tree = declaration.build().unwrap();
        assert_eq!(tree.name(), "anime");
        assert_eq!(tree.version(), 3);
        assert_eq!(tree.encode_key(tree.root(), "episodes").unwrap(), 0x21);
        assert!(tree.child_mount(tree.root(), "episodes").unwrap().is_repeated());
        assert!(!tree.child_mount(tree.root(), "identifiers").unwrap().is_repeated());
    }

    #[test]
    fn test_declaration_errors_surface_from_builder() {
        let source = r#"{
            "name": "broken",
            "scopes": [{"name": "broken", "root": true, "version": 1, "fields": {"a": 1, "b": 1}}]
        }"#;
        let declaration = ProtocolDeclaration::from_json(source, "<test>").unwrap();
        let err = declaration.build().unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::DuplicateKey);
    }

    #[test]
    fn test_malformed_json() {
        let err = ProtocolDeclaration::from_json("{not json", "bad.json").unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::MalformedDeclaration);
        assert!(err.message().contains("bad.json"));
    }

    #[test]
    fn test_load_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("anime.json"), ANIME).unwrap();
        fs::write(temp_dir.path().join("README.txt"), "ignored").unwrap();

        let mut loader = SchemaLoader::new();
        let loaded = loader.load_dir(temp_dir.path()).unwrap();
        assert_eq!(loaded, 1);
        assert!(loader.exists("anime"));
        assert_eq!(loader.names().collect::<Vec<_>>(), vec!["anime"]);
    }

    #[test]
    fn test_load_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new();
        let loaded = loader.load_dir(&temp_dir.path().join("absent")).unwrap();
        assert_eq!(loaded, 0);
        assert_eq!(loader.protocol_count(), 0);
    }

    #[test]
    fn test_register_twice_rejected() {
        let tree = ProtocolDeclaration::from_json(ANIME, "<test>").unwrap().build().unwrap();
        let mut loader = SchemaLoader::new();
        loader.register("anime", tree.clone()).unwrap();
        let err = loader.register("anime", tree).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::ProtocolExists);
    }

    #[test]
    fn test_builtin_protocols_registered() {
        let loader = SchemaLoader::with_builtin().unwrap();
        for name in ["episode", "movie", "season", "show"] {
            assert!(loader.exists(name), "missing {}", name);
        }
    }

    #[test]
    fn test_declaration_shadowing_builtin_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let source = ANIME.replacen("\"name\": \"anime\",", "\"name\": \"show\",", 1);
        fs::write(temp_dir.path().join("show.json"), source).unwrap();

        let mut loader = SchemaLoader::with_builtin().unwrap();
        let err = loader.load_dir(temp_dir.path()).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::ProtocolExists);
    }
}
