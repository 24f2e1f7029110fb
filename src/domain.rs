//! Domain models for issue tracking.
//!
//! These are the values handed to and returned from the storage engine. They
//! are independent of the on-disk document format.

/// Strongly typed record identifiers.
pub mod id;
pub use id::{ChecklistId, ChecklistItemId, IssueId, VersionId};

mod issue;
pub use issue::{Issue, IssueDraft};

mod version;
pub use version::Version;

mod checklist;
pub use checklist::{Checklist, ChecklistItem};

mod config;
pub use config::Config;
