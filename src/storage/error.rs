use std::{io, path::PathBuf};

use crate::{
    domain::{ChecklistId, ChecklistItemId, IssueId, VersionId},
    storage::UpgradeError,
};

/// Errors returned by storage engine operations.
///
/// Validation failures are always raised before the document is rewritten, so
/// a failed operation never leaves a partially applied change on disk.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No issue has the requested id.
    #[error("issue {0} not found")]
    IssueNotFound(IssueId),

    /// No version has the requested id.
    #[error("version {0} not found")]
    VersionNotFound(VersionId),

    /// No checklist has the requested id.
    #[error("checklist {0} not found")]
    ChecklistNotFound(ChecklistId),

    /// No checklist item has the requested id.
    #[error("checklist item {0} not found")]
    ChecklistItemNotFound(ChecklistItemId),

    /// Another version already uses the requested name.
    #[error("a version named '{0}' already exists")]
    VersionAlreadyExists(String),

    /// Every identifier for this kind of record is taken.
    #[error("no {0} ids left to assign")]
    IdsExhausted(&'static str),

    /// The database file could not be read or written.
    #[error("failed to access database file {}", path.display())]
    Io {
        /// The database file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The database file does not contain a valid document.
    #[error("failed to parse database file {}", path.display())]
    Json {
        /// The database file.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Broad classification of an [`Error`].
///
/// An outer HTTP layer maps [`ErrorKind::NotFound`] to 404 and
/// [`ErrorKind::Conflict`] to 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The addressed or referenced record does not exist.
    NotFound,
    /// A uniqueness constraint would be violated.
    Conflict,
    /// The backing file could not be accessed or parsed.
    Storage,
}

impl Error {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::IssueNotFound(_)
            | Self::VersionNotFound(_)
            | Self::ChecklistNotFound(_)
            | Self::ChecklistItemNotFound(_) => ErrorKind::NotFound,
            Self::VersionAlreadyExists(_) => ErrorKind::Conflict,
            Self::IdsExhausted(_) | Self::Io { .. } | Self::Json { .. } => ErrorKind::Storage,
        }
    }
}

/// Errors raised while opening a database.
///
/// These are fatal: the store cannot be used until they are resolved.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// A new database file could not be written.
    #[error("failed to create database file {}", path.display())]
    Create {
        /// The database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: Error,
    },

    /// An existing database is at the current schema but its content does not
    /// form a valid document.
    #[error("failed to load database file {}", path.display())]
    Load {
        /// The database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: Error,
    },

    /// An existing database could not be brought up to the current schema.
    #[error("failed to upgrade database file {}", path.display())]
    Upgrade {
        /// The database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: UpgradeError,
    },
}
