//! Maximizer: compact record -> structured record
//!
//! Decoding is lenient:
//! - Unknown key codes are skipped (data from a newer schema)
//! - A mounted field with the wrong shape is dropped and reported as
//!   OEM_SHAPE_MISMATCH, siblings keep decoding
//! - Nothing aborts the whole record

use serde_json::Value;

use crate::observability::{log_event_with_fields, Event};
use crate::schema::{KeyCodec, SchemaError, SchemaTree, SchemaVersion, ScopeId, ShapeDetails};

use super::minimizer::make_path;
use super::record::{CompactDocument, CompactRecord, CompactValue, StructuredRecord};

/// Result of a lenient decode
#[derive(Debug, Clone, PartialEq)]
pub struct Maximized {
    /// Version read from the document header
    pub version: SchemaVersion,
    /// Decoded record
    pub record: StructuredRecord,
    /// Fields dropped because of a shape mismatch
    pub mismatches: Vec<SchemaError>,
    /// Paths of key codes the tree does not know
    pub unknown_keys: Vec<String>,
}

impl Maximized {
    /// Whether every key decoded without loss
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty() && self.unknown_keys.is_empty()
    }

    pub fn into_record(self) -> StructuredRecord {
        self.record
    }
}

#[derive(Default)]
struct DecodeReport {
    mismatches: Vec<SchemaError>,
    unknown_keys: Vec<String>,
}

/// Decodes compact records against one schema tree.
pub struct Maximizer<'t> {
    tree: &'t SchemaTree,
}

impl<'t> Maximizer<'t> {
    pub fn new(tree: &'t SchemaTree) -> Self {
        Self { tree }
    }

    /// Maximizes a versioned document.
    pub fn maximize(&self, document: &CompactDocument) -> Maximized {
        self.maximize_record(document.version, &document.body)
    }

    /// Maximizes a root record whose header carried `version`.
    ///
    /// Evolution is additive, so the current tree decodes every historical
    /// version; a newer version is decoded too, ignoring unknown keys.
    pub fn maximize_record(&self, version: SchemaVersion, compact: &CompactRecord) -> Maximized {
        if version > self.tree.version() {
            let document_version = format!("{:#04x}", version);
            let tree_version = format!("{:#04x}", self.tree.version());
            log_event_with_fields(
                Event::SchemaVersionAhead,
                &[
                    ("document_version", document_version.as_str()),
                    ("schema", self.tree.name()),
                    ("tree_version", tree_version.as_str()),
                ],
            );
        }

        let mut report = DecodeReport::default();
        let record = self.maximize_scope(self.tree.root(), compact, "", &mut report);

        Maximized {
            version,
            record,
            mismatches: report.mismatches,
            unknown_keys: report.unknown_keys,
        }
    }

    fn maximize_scope(
        &self,
        scope: ScopeId,
        compact: &CompactRecord,
        path_prefix: &str,
        report: &mut DecodeReport,
    ) -> StructuredRecord {
        let mut record = StructuredRecord::new();

        for (key, value) in compact.iter() {
            let Some(field) = self.tree.decode_key(scope, key) else {
                let key_path = make_path(path_prefix, &format!("{:#04x}", key));
                log_event_with_fields(
                    Event::UnknownKeySkipped,
                    &[("path", key_path.as_str()), ("scope", self.tree.scope_name(scope))],
                );
                report.unknown_keys.push(key_path);
                continue;
            };
            let field_path = make_path(path_prefix, field);

            let decoded = match self.tree.child_mount(scope, field) {
                None => Some(value.to_json()),
                Some(mount) if !mount.is_repeated() => match value.as_record() {
                    Some(nested) => Some(Value::Object(self.maximize_scope(
                        mount.child,
                        &nested,
                        &field_path,
                        report,
                    ))),
                    None => {
                        self.report_mismatch(scope, &field_path, "record", value, report);
                        None
                    }
                },
                Some(mount) => match value.as_records() {
                    Some(items) => Some(Value::Array(
                        items
                            .iter()
                            .enumerate()
                            .map(|(index, item)| {
                                let item_path = format!("{}[{}]", field_path, index);
                                Value::Object(self.maximize_scope(
                                    mount.child,
                                    item,
                                    &item_path,
                                    report,
                                ))
                            })
                            .collect(),
                    )),
                    None => {
                        self.report_mismatch(scope, &field_path, "sequence", value, report);
                        None
                    }
                },
            };

            if let Some(decoded) = decoded {
                record.insert(field.to_string(), decoded);
            }
        }

        record
    }

    fn report_mismatch(
        &self,
        scope: ScopeId,
        path: &str,
        expected: &str,
        value: &CompactValue,
        report: &mut DecodeReport,
    ) {
        let scope_name = self.tree.scope_name(scope);
        log_event_with_fields(
            Event::ShapeMismatch,
            &[
                ("actual", value.shape_name()),
                ("expected", expected),
                ("path", path),
                ("scope", scope_name),
            ],
        );
        report.mismatches.push(
            SchemaError::shape_mismatch(
                scope_name,
                ShapeDetails::new(path, expected, value.shape_name()),
            )
            .into_lenient(),
        );
    }
}

/// Maximizes `compact` (with header `version`) against `tree`.
pub fn maximize(version: SchemaVersion, compact: &CompactRecord, tree: &SchemaTree) -> Maximized {
    Maximizer::new(tree).maximize_record(version, compact)
}
