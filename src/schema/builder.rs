//! Declarative schema builder
//!
//! Scopes are registered with `define`, linked with `mount` and validated as
//! a whole by `finalize`, which hands back an immutable `SchemaTree`.
//!
//! ```ignore
//! let mut builder = SchemaBuilder::new();
//! builder.define("show", true, Some(0x01), [("names", 0x02), ("seasons", 0x21)])?;
//! builder.define("season", false, None, [("names", 0x02)])?;
//! builder.mount("show", "seasons", "season", MountOptions::repeated())?;
//! let tree = builder.finalize()?;
//! ```

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::observability::{log_event_with_fields, Event};

use super::errors::{SchemaError, SchemaResult};
use super::tree::{SchemaTree, ScopeNode};
use super::types::{ChildMount, KeyCode, MountOptions, SchemaDefinition, SchemaVersion, ScopeId};

struct PendingMount {
    key: KeyCode,
    child: usize,
    options: MountOptions,
}

struct PendingScope {
    definition: SchemaDefinition,
    mounts: BTreeMap<String, PendingMount>,
}

/// Collects scope definitions and mounts until `finalize`.
#[derive(Default)]
pub struct SchemaBuilder {
    scopes: Vec<PendingScope>,
    names: HashMap<String, usize>,
}

impl SchemaBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a scope.
    ///
    /// # Errors
    ///
    /// - `OEM_INVALID_SCOPE` if the name is taken, or `version` is given on a
    ///   non-root scope, or a root scope has no version
    /// - `OEM_DUPLICATE_KEY` if two fields share a key code or a name
    pub fn define<I, S>(
        &mut self,
        scope_name: &str,
        is_root: bool,
        version: Option<SchemaVersion>,
        fields: I,
    ) -> SchemaResult<ScopeId>
    where
        I: IntoIterator<Item = (S, KeyCode)>,
        S: Into<String>,
    {
        if self.names.contains_key(scope_name) {
            return Err(SchemaError::invalid_scope(scope_name, "scope already defined"));
        }
        if !is_root && version.is_some() {
            return Err(SchemaError::invalid_scope(
                scope_name,
                "version is only allowed on root scopes",
            ));
        }
        if is_root && version.is_none() {
            return Err(SchemaError::invalid_scope(scope_name, "root scope requires a version"));
        }

        let mut declared: BTreeMap<String, KeyCode> = BTreeMap::new();
        let mut by_code: HashMap<KeyCode, String> = HashMap::new();
        for (field, code) in fields {
            let field = field.into();
            if declared.contains_key(&field) {
                return Err(SchemaError::duplicate_field(scope_name, &field));
            }
            if let Some(existing) = by_code.get(&code) {
                return Err(SchemaError::duplicate_key(scope_name, code, existing, &field));
            }
            by_code.insert(code, field.clone());
            declared.insert(field, code);
        }

        let index = self.scopes.len();
        self.scopes.push(PendingScope {
            definition: SchemaDefinition {
                scope_name: scope_name.to_string(),
                version,
                is_root,
                fields: declared,
            },
            mounts: BTreeMap::new(),
        });
        self.names.insert(scope_name.to_string(), index);

        Ok(ScopeId(index))
    }

    /// Expands `field_name` of `parent_scope` into `child_scope`.
    ///
    /// The field must already carry a key code in the parent; nested data is
    /// stored under that code.
    ///
    /// # Errors
    ///
    /// - `OEM_UNKNOWN_SCOPE` if either scope is not defined
    /// - `OEM_UNKNOWN_FIELD` if the parent does not declare the field
    /// - `OEM_MOUNT_CONFLICT` if the field is already mounted
    pub fn mount(
        &mut self,
        parent_scope: &str,
        field_name: &str,
        child_scope: &str,
        options: MountOptions,
    ) -> SchemaResult<()> {
        let parent = *self
            .names
            .get(parent_scope)
            .ok_or_else(|| SchemaError::unknown_scope(parent_scope))?;
        let child = *self
            .names
            .get(child_scope)
            .ok_or_else(|| SchemaError::unknown_scope(child_scope))?;

        let pending = &mut self.scopes[parent];
        let key = pending
            .definition
            .key_of(field_name)
            .ok_or_else(|| SchemaError::unknown_field(parent_scope, field_name))?;
        if pending.mounts.contains_key(field_name) {
            return Err(SchemaError::mount_conflict(parent_scope, field_name));
        }

        pending
            .mounts
            .insert(field_name.to_string(), PendingMount { key, child, options });
        Ok(())
    }

    /// Validates the collected scopes and produces the immutable tree.
    ///
    /// # Errors
    ///
    /// - `OEM_NO_ROOT` if no root scope was defined
    /// - `OEM_INVALID_SCOPE` if several roots exist or a scope is unreachable
    ///   from the root
    /// - `OEM_CYCLIC_SCHEMA` if mounts form a cycle
    pub fn finalize(self) -> SchemaResult<SchemaTree> {
        let roots: Vec<usize> = self
            .scopes
            .iter()
            .enumerate()
            .filter(|(_, scope)| scope.definition.is_root)
            .map(|(index, _)| index)
            .collect();

        let root = match roots.as_slice() {
            [] => return Err(SchemaError::no_root()),
            [root] => *root,
            [_, second, ..] => {
                return Err(SchemaError::invalid_scope(
                    &self.scopes[*second].definition.scope_name,
                    "a tree has exactly one root scope",
                ))
            }
        };

        self.check_acyclic()?;

        // Breadth-first from the root; arena order follows discovery order
        let mut order: Vec<usize> = Vec::with_capacity(self.scopes.len());
        let mut remap: HashMap<usize, usize> = HashMap::new();
        let mut queue = VecDeque::from([root]);
        remap.insert(root, 0);
        while let Some(index) = queue.pop_front() {
            order.push(index);
            for mount in self.scopes[index].mounts.values() {
                if !remap.contains_key(&mount.child) {
                    remap.insert(mount.child, remap.len());
                    queue.push_back(mount.child);
                }
            }
        }

        if let Some(orphan) = (0..self.scopes.len()).find(|index| !remap.contains_key(index)) {
            return Err(SchemaError::invalid_scope(
                &self.scopes[orphan].definition.scope_name,
                format!(
                    "not reachable from root '{}'",
                    self.scopes[root].definition.scope_name
                ),
            ));
        }

        let root_name = self.scopes[root].definition.scope_name.clone();
        let version = self.scopes[root].definition.version.unwrap_or_default();

        let mut slots: Vec<Option<PendingScope>> = self.scopes.into_iter().map(Some).collect();
        let mut nodes = Vec::with_capacity(order.len());
        let mut names = HashMap::with_capacity(order.len());
        for index in order {
            let Some(pending) = slots[index].take() else {
                continue;
            };
            let mut node = ScopeNode::new(pending.definition);
            for (field, mount) in pending.mounts {
                node.mounts.insert(
                    field,
                    ChildMount {
                        key: mount.key,
                        child: ScopeId(remap[&mount.child]),
                        options: mount.options,
                    },
                );
            }
            names.insert(node.definition.scope_name.clone(), ScopeId(nodes.len()));
            nodes.push(node);
        }

        let scope_count = nodes.len().to_string();
        let version_str = format!("{:#04x}", version);
        log_event_with_fields(
            Event::SchemaTreeFinalized,
            &[
                ("root", root_name.as_str()),
                ("scopes", scope_count.as_str()),
                ("version", version_str.as_str()),
            ],
        );

        Ok(SchemaTree::from_parts(nodes, names, ScopeId(0), version))
    }

    /// Depth-first search over mount edges, rejecting back edges.
    fn check_acyclic(&self) -> SchemaResult<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        fn visit(
            builder: &SchemaBuilder,
            index: usize,
            marks: &mut [Mark],
            stack: &mut Vec<usize>,
        ) -> SchemaResult<()> {
            marks[index] = Mark::InProgress;
            stack.push(index);
            for mount in builder.scopes[index].mounts.values() {
                match marks[mount.child] {
                    Mark::InProgress => {
                        let start = stack.iter().position(|i| *i == mount.child).unwrap_or(0);
                        let mut path: Vec<&str> = stack[start..]
                            .iter()
                            .map(|i| builder.scopes[*i].definition.scope_name.as_str())
                            .collect();
                        path.push(builder.scopes[mount.child].definition.scope_name.as_str());
                        return Err(SchemaError::cyclic(&path));
                    }
                    Mark::Unvisited => visit(builder, mount.child, marks, stack)?,
                    Mark::Done => {}
                }
            }
            stack.pop();
            marks[index] = Mark::Done;
            Ok(())
        }

        let mut marks = vec![Mark::Unvisited; self.scopes.len()];
        let mut stack = Vec::new();
        for index in 0..self.scopes.len() {
            if marks[index] == Mark::Unvisited {
                visit(self, index, &mut marks, &mut stack)?;
            }
        }
        Ok(())
    }
}
