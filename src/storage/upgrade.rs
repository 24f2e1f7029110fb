//! Upgrades of the on-disk document to the current schema.
//!
//! The document carries an integer `Version` tag. Each upgrade step moves the
//! document from version `N` to `N + 1` by adding fields and collections with
//! empty defaults; no step removes or rewrites an existing value.
//!
//! Steps operate on an untyped [`serde_json::Value`] rather than on the typed
//! document model, so a step stays valid however the model changes later.

use std::{fs, io, path::Path};

use serde_json::{Map, Value};

/// The schema version written by this version of the crate.
pub const CURRENT_VERSION: u32 = 4;

const VERSION_FIELD: &str = "Version";

type Step = fn(&mut Map<String, Value>) -> Result<(), UpgradeError>;

/// Upgrade steps, keyed by the version they upgrade *from*.
const STEPS: &[(u32, Step)] = &[
    (1, add_versions),
    (2, add_checklists),
    (3, add_checklist_items),
];

/// Errors that can occur while detecting or upgrading a document's schema.
#[derive(Debug, thiserror::Error)]
pub enum UpgradeError {
    /// The document could not be read or written.
    #[error("failed to access the database document")]
    Io(#[from] io::Error),

    /// The document is not valid JSON.
    #[error("the database document is not valid JSON")]
    Json(#[from] serde_json::Error),

    /// The document root is not a JSON object.
    #[error("the database document is not a JSON object")]
    NotAnObject,

    /// The document has no integer schema version tag.
    #[error("the database document has no schema version")]
    MissingVersion,

    /// A field that a step relies on is absent or has the wrong shape.
    #[error("cannot upgrade from version {version}: field '{field}' is missing or malformed")]
    MissingField {
        /// The version being upgraded from.
        version: u32,
        /// The field that was expected.
        field: &'static str,
    },

    /// The upgrade chain finished without reaching the current version.
    #[error("database schema version {found} cannot be upgraded to version {expected}")]
    VersionMismatch {
        /// The version the chain stopped at.
        found: u32,
        /// The version the chain should have reached.
        expected: u32,
    },
}

/// Reads the schema version tag from a raw document.
///
/// # Errors
///
/// Returns an error if the root is not an object or the tag is missing or not
/// a non-negative integer that fits in a `u32`.
pub fn detect_version(raw: &Value) -> Result<u32, UpgradeError> {
    let root = raw.as_object().ok_or(UpgradeError::NotAnObject)?;
    root.get(VERSION_FIELD)
        .and_then(Value::as_u64)
        .and_then(|version| u32::try_from(version).ok())
        .ok_or(UpgradeError::MissingVersion)
}

/// Returns `true` if the document at `path` is not at [`CURRENT_VERSION`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or carries no
/// version tag.
pub fn is_upgrade_required(path: &Path) -> Result<bool, UpgradeError> {
    let raw = read(path)?;
    Ok(detect_version(&raw)? != CURRENT_VERSION)
}

/// Upgrades the document at `path` to [`CURRENT_VERSION`] in place.
///
/// Returns the version the document was at before the upgrade. The file is
/// rewritten only if every step succeeds; on error it is left untouched.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or written, if a step
/// finds the document malformed, or if the chain cannot reach the current
/// version.
pub fn perform_upgrade(path: &Path) -> Result<u32, UpgradeError> {
    let mut raw = read(path)?;
    let from = upgrade_document(&mut raw)?;
    if from != CURRENT_VERSION {
        fs::write(path, serde_json::to_vec(&raw)?)?;
    }
    Ok(from)
}

/// Upgrades an in-memory document to [`CURRENT_VERSION`].
///
/// Steps are applied one version at a time until the document reaches the
/// current version or no step exists for its version. Returns the version the
/// document started at.
///
/// # Errors
///
/// Returns an error if a step finds the document malformed, or if the final
/// version is not [`CURRENT_VERSION`].
pub fn upgrade_document(raw: &mut Value) -> Result<u32, UpgradeError> {
    let from = detect_version(raw)?;
    let mut version = from;

    while version != CURRENT_VERSION {
        let Some((_, step)) = STEPS.iter().find(|(step_from, _)| *step_from == version) else {
            break;
        };

        let root = raw.as_object_mut().ok_or(UpgradeError::NotAnObject)?;
        step(root)?;
        root.insert(VERSION_FIELD.to_owned(), Value::from(version + 1));

        tracing::debug!("Upgraded database document from version {version} to {}", version + 1);
        version = detect_version(raw)?;
    }

    if version == CURRENT_VERSION {
        Ok(from)
    } else {
        Err(UpgradeError::VersionMismatch {
            found: version,
            expected: CURRENT_VERSION,
        })
    }
}

fn read(path: &Path) -> Result<Value, UpgradeError> {
    let content = fs::read(path)?;
    Ok(serde_json::from_slice(&content)?)
}

fn array_mut<'a>(
    root: &'a mut Map<String, Value>,
    field: &'static str,
    version: u32,
) -> Result<&'a mut Vec<Value>, UpgradeError> {
    root.get_mut(field)
        .and_then(Value::as_array_mut)
        .ok_or(UpgradeError::MissingField { version, field })
}

fn add_empty_array(root: &mut Map<String, Value>, field: &str) {
    root.entry(field)
        .or_insert_with(|| Value::Array(Vec::new()));
}

/// Version 2 introduced versions, and an optional version on each issue.
fn add_versions(root: &mut Map<String, Value>) -> Result<(), UpgradeError> {
    for issue in array_mut(root, "Issues", 1)? {
        let issue = issue.as_object_mut().ok_or(UpgradeError::MissingField {
            version: 1,
            field: "Issues",
        })?;
        issue.entry("VersionId").or_insert(Value::Null);
    }
    add_empty_array(root, "Versions");
    Ok(())
}

/// Version 3 introduced checklists.
fn add_checklists(root: &mut Map<String, Value>) -> Result<(), UpgradeError> {
    array_mut(root, "Issues", 2)?;
    add_empty_array(root, "Checklists");
    Ok(())
}

/// Version 4 introduced checklist items.
fn add_checklist_items(root: &mut Map<String, Value>) -> Result<(), UpgradeError> {
    array_mut(root, "Checklists", 3)?;
    add_empty_array(root, "ChecklistItems");
    Ok(())
}
