use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{IssueId, Version, VersionId};

/// An issue as returned by the storage engine.
///
/// The version is hydrated from the live version record on every read, so a
/// renamed version is visible immediately on every issue referencing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Identifier, assigned on creation.
    pub id: IssueId,
    /// Short summary.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Workflow status. Not interpreted by the store.
    pub status: String,
    /// When the issue was created. Never changes.
    pub created_date_time: DateTime<Utc>,
    /// When the issue, or any checklist or checklist item it owns, last
    /// changed.
    pub updated_date_time: DateTime<Utc>,
    /// The version the issue is assigned to, if any.
    pub version: Option<Version>,
}

/// The caller-supplied fields of an issue.
///
/// Used both to create an issue and to replace the mutable fields of an
/// existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueDraft {
    /// Short summary.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Workflow status.
    pub status: String,
    /// The version to assign, which must exist.
    #[serde(default)]
    pub version_id: Option<VersionId>,
}

impl IssueDraft {
    /// Creates a draft with no version assigned.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: status.into(),
            version_id: None,
        }
    }

    /// Assigns the draft to a version.
    #[must_use]
    pub fn with_version(mut self, version_id: VersionId) -> Self {
        self.version_id = Some(version_id);
        self
    }
}
