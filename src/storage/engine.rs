//! The storage engine.
//!
//! [`IssuesStorage`] owns nothing but the path of the database file and a
//! lock. Every operation takes the lock, reads the whole document, works on
//! it in memory and, if it changed anything, writes the whole document back
//! before releasing the lock. Operations are therefore linearizable, and a
//! failed operation never writes.

use std::{
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::Utc;
use serde::Serialize;

use crate::{
    domain::{
        Checklist, ChecklistId, ChecklistItem, ChecklistItemId, Config, Issue, IssueDraft,
        IssueId, Version, VersionId,
    },
    storage::{
        Error, OpenError, UpgradeError,
        document::{
            ChecklistItemRecord, ChecklistRecord, Document, Format, IssueRecord, VersionRecord,
            advance,
        },
        upgrade,
    },
};

/// A JSON file backed store of issues, versions and checklists.
///
/// The store may be shared between threads. A single lock serializes every
/// operation, reads included.
#[derive(Debug)]
pub struct IssuesStorage {
    path: PathBuf,
    format: Format,
    lock: Mutex<()>,
}

/// Collection sizes and schema version of a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Schema version of the document on disk.
    pub schema_version: u32,
    /// Number of issues.
    pub issues: usize,
    /// Number of versions.
    pub versions: usize,
    /// Number of checklists.
    pub checklists: usize,
    /// Number of checklist items.
    pub checklist_items: usize,
}

impl IssuesStorage {
    /// Opens the database at `path`, writing compact JSON.
    ///
    /// If the file does not exist, an empty database is created. If it exists
    /// but was written with an older schema, it is upgraded in place. Once
    /// this returns, the file is at the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if a new file cannot be written, or if an existing
    /// file cannot be read, parsed or upgraded.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, OpenError> {
        Self::open_with_format(path.into(), Format::Compact)
    }

    /// Opens the database named by `config`.
    ///
    /// A relative database path is resolved against `base`, normally the
    /// directory containing the configuration file.
    ///
    /// # Errors
    ///
    /// See [`IssuesStorage::open`].
    pub fn from_config(config: &Config, base: &Path) -> Result<Self, OpenError> {
        let format = if config.pretty {
            Format::Pretty
        } else {
            Format::Compact
        };
        Self::open_with_format(config.database_path(base), format)
    }

    fn open_with_format(path: PathBuf, format: Format) -> Result<Self, OpenError> {
        if path.exists() {
            let upgrade_error = |source: UpgradeError| OpenError::Upgrade {
                path: path.clone(),
                source,
            };

            if upgrade::is_upgrade_required(&path).map_err(upgrade_error)? {
                tracing::info!("Upgrading existing database {}", path.display());
                let from = upgrade::perform_upgrade(&path).map_err(upgrade_error)?;
                tracing::info!(
                    "Database upgrade complete (version {from} to {})",
                    upgrade::CURRENT_VERSION
                );
            } else {
                tracing::info!("Existing database {} is up to date", path.display());
            }

            Document::read(&path).map_err(|source| OpenError::Load {
                path: path.clone(),
                source,
            })?;
        } else {
            tracing::info!("Creating new database {}", path.display());
            Document::default()
                .write(&path, format)
                .map_err(|source| OpenError::Create {
                    path: path.clone(),
                    source,
                })?;
        }

        Ok(Self {
            path,
            format,
            lock: Mutex::new(()),
        })
    }

    /// The path of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // Nothing is cached behind the lock, so a panic in another caller
        // cannot leave state that needs discarding.
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read<T>(&self, f: impl FnOnce(&Document) -> Result<T, Error>) -> Result<T, Error> {
        let _guard = self.lock();
        let document = Document::read(&self.path)?;
        f(&document)
    }

    fn modify<T>(&self, f: impl FnOnce(&mut Document) -> Result<T, Error>) -> Result<T, Error> {
        let _guard = self.lock();
        let mut document = Document::read(&self.path)?;
        let output = f(&mut document)?;
        document.write(&self.path, self.format)?;
        Ok(output)
    }

    /// Creates an issue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VersionNotFound`] if the draft names a version that
    /// does not exist.
    pub fn create_issue(&self, draft: IssueDraft) -> Result<Issue, Error> {
        self.modify(|document| {
            document.check_version_reference(draft.version_id)?;

            let now = Utc::now();
            let record = IssueRecord {
                id: document.next_issue_id()?,
                title: draft.title,
                description: draft.description,
                status: draft.status,
                created_date_time: now,
                updated_date_time: now,
                version_id: draft.version_id,
            };
            let issue = document.hydrate_issue(&record)?;
            document.issues.push(record);

            tracing::debug!("Created issue {}", issue.id);
            Ok(issue)
        })
    }

    /// Returns every issue, in the order they were created.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub fn get_all_issues(&self) -> Result<Vec<Issue>, Error> {
        self.read(|document| {
            document
                .issues
                .iter()
                .map(|issue| document.hydrate_issue(issue))
                .collect()
        })
    }

    /// Returns a single issue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IssueNotFound`] if there is no such issue.
    pub fn get_issue(&self, id: IssueId) -> Result<Issue, Error> {
        self.read(|document| document.hydrate_issue(document.issue(id)?))
    }

    /// Replaces the title, description, status and version of an issue.
    ///
    /// The creation time is kept and the updated time advances.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IssueNotFound`] if there is no such issue, or
    /// [`Error::VersionNotFound`] if the draft names a version that does not
    /// exist.
    pub fn update_issue(&self, id: IssueId, draft: IssueDraft) -> Result<Issue, Error> {
        self.modify(|document| {
            document.issue(id)?;
            document.check_version_reference(draft.version_id)?;

            let issue = document.issue_mut(id)?;
            issue.title = draft.title;
            issue.description = draft.description;
            issue.status = draft.status;
            issue.version_id = draft.version_id;
            issue.updated_date_time = advance(issue.updated_date_time);

            tracing::debug!("Updated issue {id}");
            document.hydrate_issue(document.issue(id)?)
        })
    }

    /// Creates a version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VersionAlreadyExists`] if the name is taken.
    pub fn create_version(&self, name: impl Into<String>) -> Result<Version, Error> {
        let name = name.into();
        self.modify(|document| {
            document.check_version_name_unique(&name)?;

            let record = VersionRecord {
                id: document.next_version_id()?,
                name,
            };
            let version = record.to_version();
            document.versions.push(record);

            tracing::debug!("Created version {} '{}'", version.id, version.name);
            Ok(version)
        })
    }

    /// Returns every version, in the order they were created.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub fn get_all_versions(&self) -> Result<Vec<Version>, Error> {
        self.read(|document| {
            Ok(document
                .versions
                .iter()
                .map(VersionRecord::to_version)
                .collect())
        })
    }

    /// Returns a single version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VersionNotFound`] if there is no such version.
    pub fn get_version(&self, id: VersionId) -> Result<Version, Error> {
        self.read(|document| document.version(id).map(VersionRecord::to_version))
    }

    /// Renames a version.
    ///
    /// The name must differ from every existing version's name, including
    /// this version's current name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VersionAlreadyExists`] if the name is taken, or
    /// [`Error::VersionNotFound`] if there is no such version.
    pub fn update_version(&self, id: VersionId, name: impl Into<String>) -> Result<Version, Error> {
        let name = name.into();
        self.modify(|document| {
            document.check_version_name_unique(&name)?;

            let version = document.version_mut(id)?;
            version.name = name;

            tracing::debug!("Renamed version {id} to '{}'", version.name);
            Ok(version.to_version())
        })
    }

    /// Adds a checklist to an issue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IssueNotFound`] if there is no such issue.
    pub fn create_checklist(
        &self,
        issue_id: IssueId,
        title: impl Into<String>,
    ) -> Result<Checklist, Error> {
        let title = title.into();
        self.modify(|document| {
            document.touch_issue(issue_id)?;

            let record = ChecklistRecord {
                id: document.next_checklist_id()?,
                issue_id,
                title,
            };
            let checklist = document.hydrate_checklist(&record);
            document.checklists.push(record);

            tracing::debug!("Created checklist {} on issue {issue_id}", checklist.id);
            Ok(checklist)
        })
    }

    /// Returns the checklists of an issue, each with its items.
    ///
    /// An unknown issue has no checklists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub fn get_all_checklists(&self, issue_id: IssueId) -> Result<Vec<Checklist>, Error> {
        self.read(|document| {
            Ok(document
                .checklists
                .iter()
                .filter(|checklist| checklist.issue_id == issue_id)
                .map(|checklist| document.hydrate_checklist(checklist))
                .collect())
        })
    }

    /// Returns a single checklist with its items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChecklistNotFound`] if there is no such checklist.
    pub fn get_checklist(&self, id: ChecklistId) -> Result<Checklist, Error> {
        self.read(|document| Ok(document.hydrate_checklist(document.checklist(id)?)))
    }

    /// Changes the title of a checklist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChecklistNotFound`] if there is no such checklist.
    pub fn update_checklist(
        &self,
        id: ChecklistId,
        title: impl Into<String>,
    ) -> Result<Checklist, Error> {
        let title = title.into();
        self.modify(|document| {
            document.touch_checklist_owner(id)?;
            document.checklist_mut(id)?.title = title;

            tracing::debug!("Updated checklist {id}");
            Ok(document.hydrate_checklist(document.checklist(id)?))
        })
    }

    /// Deletes a checklist together with all of its items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChecklistNotFound`] if there is no such checklist.
    pub fn delete_checklist(&self, id: ChecklistId) -> Result<(), Error> {
        self.modify(|document| {
            document.touch_checklist_owner(id)?;

            document.checklists.retain(|checklist| checklist.id != id);
            let before = document.checklist_items.len();
            document.checklist_items.retain(|item| item.checklist_id != id);

            tracing::debug!(
                "Deleted checklist {id} and {} item(s)",
                before - document.checklist_items.len()
            );
            Ok(())
        })
    }

    /// Adds an item to a checklist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChecklistNotFound`] if there is no such checklist.
    pub fn create_checklist_item(
        &self,
        checklist_id: ChecklistId,
        content: impl Into<String>,
        is_checked: bool,
    ) -> Result<ChecklistItem, Error> {
        let content = content.into();
        self.modify(|document| {
            document.touch_checklist_owner(checklist_id)?;

            let record = ChecklistItemRecord {
                id: document.next_checklist_item_id()?,
                checklist_id,
                content,
                is_checked,
            };
            let item = record.to_item();
            document.checklist_items.push(record);

            tracing::debug!("Created item {} in checklist {checklist_id}", item.id);
            Ok(item)
        })
    }

    /// Returns the items of a checklist.
    ///
    /// An unknown checklist has no items.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub fn get_all_checklist_items(
        &self,
        checklist_id: ChecklistId,
    ) -> Result<Vec<ChecklistItem>, Error> {
        self.read(|document| Ok(document.items_of(checklist_id).collect()))
    }

    /// Returns a single checklist item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChecklistItemNotFound`] if there is no such item.
    pub fn get_checklist_item(&self, id: ChecklistItemId) -> Result<ChecklistItem, Error> {
        self.read(|document| document.checklist_item(id).map(ChecklistItemRecord::to_item))
    }

    /// Replaces the content and checked state of a checklist item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChecklistItemNotFound`] if there is no such item.
    pub fn update_checklist_item(
        &self,
        id: ChecklistItemId,
        content: impl Into<String>,
        is_checked: bool,
    ) -> Result<ChecklistItem, Error> {
        let content = content.into();
        self.modify(|document| {
            let checklist_id = document.checklist_item(id)?.checklist_id;
            document.touch_checklist_owner(checklist_id)?;

            let item = document.checklist_item_mut(id)?;
            item.content = content;
            item.is_checked = is_checked;

            tracing::debug!("Updated item {id}");
            Ok(item.to_item())
        })
    }

    /// Deletes a checklist item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChecklistItemNotFound`] if there is no such item.
    pub fn delete_checklist_item(&self, id: ChecklistItemId) -> Result<(), Error> {
        self.modify(|document| {
            let checklist_id = document.checklist_item(id)?.checklist_id;
            document.touch_checklist_owner(checklist_id)?;
            document.checklist_items.retain(|item| item.id != id);

            tracing::debug!("Deleted item {id}");
            Ok(())
        })
    }

    /// Counts the records in every collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub fn summary(&self) -> Result<Summary, Error> {
        self.read(|document| {
            Ok(Summary {
                schema_version: document.version,
                issues: document.issues.len(),
                versions: document.versions.len(),
                checklists: document.checklists.len(),
                checklist_items: document.checklist_items.len(),
            })
        })
    }
}
