//! Minimizer: structured record -> compact record
//!
//! Encoding is strict:
//! - Only fields present in the input are encoded, absence is not recorded
//! - Field names missing from the scope fail the call (OEM_UNKNOWN_FIELD)
//! - Mounted fields must have the mounted shape (OEM_SHAPE_MISMATCH)
//! - Scalars are copied verbatim, no type checking

use serde_json::Value;

use crate::schema::{
    KeyCodec, SchemaError, SchemaResult, SchemaTree, SchemaVersion, ScopeId, ShapeDetails,
};

use super::record::{json_type_name, CompactDocument, CompactRecord, CompactValue, StructuredRecord};

/// Encodes structured records against one schema tree.
///
/// Holds no state besides the tree reference, so one minimizer can serve any
/// number of threads.
pub struct Minimizer<'t> {
    tree: &'t SchemaTree,
}

impl<'t> Minimizer<'t> {
    pub fn new(tree: &'t SchemaTree) -> Self {
        Self { tree }
    }

    /// Minimizes a root record into a versioned document.
    ///
    /// # Errors
    ///
    /// - `OEM_UNKNOWN_FIELD` if any scope receives an undeclared field
    /// - `OEM_SHAPE_MISMATCH` if a mounted field is not an object (singleton)
    ///   or an array of objects (repeated)
    pub fn minimize(&self, record: &StructuredRecord) -> SchemaResult<CompactDocument> {
        let body = self.minimize_scope(self.tree.root(), record, "")?;
        Ok(CompactDocument::new(self.tree.version(), body))
    }

    fn minimize_scope(
        &self,
        scope: ScopeId,
        record: &StructuredRecord,
        path_prefix: &str,
    ) -> SchemaResult<CompactRecord> {
        let mut compact = CompactRecord::new();

        for (field, value) in record {
            let key = self.tree.encode_key(scope, field)?;
            let field_path = make_path(path_prefix, field);

            let encoded = match self.tree.child_mount(scope, field) {
                None => CompactValue::Scalar(value.clone()),
                Some(mount) if !mount.is_repeated() => {
                    let nested = self.expect_object(scope, value, &field_path, "object")?;
                    CompactValue::Record(self.minimize_scope(mount.child, nested, &field_path)?)
                }
                Some(mount) => {
                    let items = value.as_array().ok_or_else(|| {
                        self.shape_error(scope, &field_path, "array of objects", value)
                    })?;
                    let mut records = Vec::with_capacity(items.len());
                    for (index, item) in items.iter().enumerate() {
                        let item_path = format!("{}[{}]", field_path, index);
                        let nested = self.expect_object(scope, item, &item_path, "object")?;
                        records.push(self.minimize_scope(mount.child, nested, &item_path)?);
                    }
                    CompactValue::Records(records)
                }
            };

            compact.insert(key, encoded);
        }

        Ok(compact)
    }

    fn expect_object<'v>(
        &self,
        scope: ScopeId,
        value: &'v Value,
        path: &str,
        expected: &str,
    ) -> SchemaResult<&'v StructuredRecord> {
        value
            .as_object()
            .ok_or_else(|| self.shape_error(scope, path, expected, value))
    }

    fn shape_error(
        &self,
        scope: ScopeId,
        path: &str,
        expected: &str,
        value: &Value,
    ) -> SchemaError {
        SchemaError::shape_mismatch(
            self.tree.scope_name(scope),
            ShapeDetails::new(path, expected, json_type_name(value)),
        )
    }
}

/// Minimizes `record` against `tree`, returning the version header and body.
pub fn minimize(
    record: &StructuredRecord,
    tree: &SchemaTree,
) -> SchemaResult<(SchemaVersion, CompactRecord)> {
    let document = Minimizer::new(tree).minimize(record)?;
    Ok((document.version, document.body))
}

/// Creates a field path from prefix and field name
pub(crate) fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
