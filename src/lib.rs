//! Embedded issue tracking storage
//!
//! Issues, versions, checklists and checklist items are stored in a single
//! JSON document on disk.

pub mod domain;
pub use domain::{
    Checklist, ChecklistId, ChecklistItem, ChecklistItemId, Config, Issue, IssueDraft, IssueId,
    Version, VersionId,
};

/// JSON file storage, schema migration and the storage engine.
pub mod storage;
pub use storage::{
    CURRENT_VERSION, Error, ErrorKind, IssuesStorage, OpenError, Summary, UpgradeError,
};
