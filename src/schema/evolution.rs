//! Append-only key evolution check
//!
//! Previously written compact data is decoded with the current tree, so a
//! key code must keep its field name and its mount forever. Fields may be
//! added or retired; codes may not be reused.

use super::errors::{SchemaError, SchemaResult};
use super::tree::SchemaTree;
use super::types::ScopeId;

/// Verifies that `next` only extends `previous`.
///
/// # Errors
///
/// - `OEM_INVALID_SCOPE` if the roots differ or the version went backwards
/// - `OEM_KEY_REASSIGNED` if a key code of a shared scope changed its field
/// - `OEM_MOUNT_CHANGED` if a kept field became plain, mounted, single,
///   repeated, or moved to another child scope
pub fn verify_evolution(previous: &SchemaTree, next: &SchemaTree) -> SchemaResult<()> {
    if previous.name() != next.name() {
        return Err(SchemaError::invalid_scope(
            next.name(),
            format!("root changed from '{}'", previous.name()),
        ));
    }
    if next.version() < previous.version() {
        return Err(SchemaError::invalid_scope(
            next.name(),
            format!(
                "version went backwards from {:#04x} to {:#04x}",
                previous.version(),
                next.version()
            ),
        ));
    }

    for old in previous.definitions() {
        let (Some(old_scope), Some(new_scope)) = (
            previous.scope_id(&old.scope_name),
            next.scope_id(&old.scope_name),
        ) else {
            continue;
        };
        let Some(new) = next.definition(new_scope) else {
            continue;
        };
        for (field, code) in &old.fields {
            let Some(current) = new.field_of(*code) else {
                continue;
            };
            if current != field {
                return Err(SchemaError::key_reassigned(
                    &old.scope_name,
                    *code,
                    field,
                    current,
                ));
            }

            let was = mount_shape(previous, old_scope, field);
            let is = mount_shape(next, new_scope, field);
            if was != is {
                return Err(SchemaError::mount_changed(&old.scope_name, field, &was, &is));
            }
        }
    }

    Ok(())
}

/// Describes how `field` is stored: plain, or mounted on a named child.
fn mount_shape(tree: &SchemaTree, scope: ScopeId, field: &str) -> String {
    match tree.child_mount(scope, field) {
        None => "plain".to_string(),
        Some(mount) if mount.is_repeated() => {
            format!("repeated '{}'", tree.scope_name(mount.child))
        }
        Some(mount) => format!("single '{}'", tree.scope_name(mount.child)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{MountOptions, SchemaBuilder, SchemaErrorCode, SchemaVersion};

    fn tree(version: SchemaVersion, id_fields: &[(&str, u16)]) -> SchemaTree {
        let mut builder = SchemaBuilder::new();
        builder
            .define("show", true, Some(version), [("identifiers", 0x01), ("names", 0x02)])
            .unwrap();
        builder
            .define("show.identifiers", false, None, id_fields.iter().copied())
            .unwrap();
        builder
            .mount("show", "identifiers", "show.identifiers", MountOptions::single())
            .unwrap();
        builder.finalize().unwrap()
    }

    #[test]
    fn test_additive_change_accepted() {
        let previous = tree(1, &[("imdb", 0x02)]);
        let next = tree(2, &[("imdb", 0x02), ("tvdb", 0x03)]);
        assert!(verify_evolution(&previous, &next).is_ok());
    }

    #[test]
    fn test_retired_field_accepted() {
        let previous = tree(1, &[("anidb", 0x01), ("imdb", 0x02)]);
        let next = tree(2, &[("imdb", 0x02)]);
        assert!(verify_evolution(&previous, &next).is_ok());
    }

    #[test]
    fn test_reused_code_rejected() {
        let previous = tree(1, &[("anidb", 0x01), ("imdb", 0x02)]);
        let next = tree(2, &[("tmdb", 0x01), ("imdb", 0x02)]);
        let err = verify_evolution(&previous, &next).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::KeyReassigned);
        assert_eq!(err.scope(), Some("show.identifiers"));
    }

    fn show(seasons: Option<MountOptions>) -> SchemaTree {
        let mut builder = SchemaBuilder::new();
        builder
            .define("show", true, Some(1), [("names", 0x02), ("seasons", 0x21)])
            .unwrap();
        if let Some(options) = seasons {
            builder.define("season", false, None, [("names", 0x02)]).unwrap();
            builder.mount("show", "seasons", "season", options).unwrap();
        }
        builder.finalize().unwrap()
    }

    #[test]
    fn test_plain_field_becoming_mounted_rejected() {
        let previous = show(None);
        let next = show(Some(MountOptions::repeated()));

        let err = verify_evolution(&previous, &next).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::MountChanged);
        assert_eq!(err.field(), Some("seasons"));
        assert!(err.message().contains("plain"));

        let err = verify_evolution(&next, &previous).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::MountChanged);
    }

    #[test]
    fn test_single_becoming_repeated_rejected() {
        let previous = show(Some(MountOptions::single()));
        let next = show(Some(MountOptions::repeated()));
        let err = verify_evolution(&previous, &next).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::MountChanged);
        assert!(err.message().contains("repeated 'season'"));
    }

    #[test]
    fn test_unchanged_mount_accepted() {
        let previous = show(Some(MountOptions::repeated()));
        let next = show(Some(MountOptions::repeated()));
        assert!(verify_evolution(&previous, &next).is_ok());
    }

    #[test]
    fn test_version_regression_rejected() {
        let previous = tree(2, &[("imdb", 0x02)]);
        let next = tree(1, &[("imdb", 0x02)]);
        let err = verify_evolution(&previous, &next).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::InvalidScope);
    }
}
