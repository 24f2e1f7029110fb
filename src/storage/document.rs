//! The persisted document.
//!
//! The whole database is a single JSON object with one array per record kind
//! and a schema version tag. A [`Document`] is read fresh from disk for every
//! operation and never outlives it.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        Checklist, ChecklistId, ChecklistItem, ChecklistItemId, Issue, IssueId, Version,
        VersionId, id::next_id,
    },
    storage::{CURRENT_VERSION, Error},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Document {
    pub version: u32,
    pub issues: Vec<IssueRecord>,
    pub versions: Vec<VersionRecord>,
    pub checklists: Vec<ChecklistRecord>,
    pub checklist_items: Vec<ChecklistItemRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IssueRecord {
    pub id: IssueId,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_date_time: DateTime<Utc>,
    pub updated_date_time: DateTime<Utc>,
    pub version_id: Option<VersionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionRecord {
    pub id: VersionId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChecklistRecord {
    pub id: ChecklistId,
    pub issue_id: IssueId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChecklistItemRecord {
    pub id: ChecklistItemId,
    pub checklist_id: ChecklistId,
    pub content: String,
    pub is_checked: bool,
}

/// How the document is laid out when written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Compact,
    Pretty,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            issues: Vec::new(),
            versions: Vec::new(),
            checklists: Vec::new(),
            checklist_items: Vec::new(),
        }
    }
}

impl Document {
    pub fn read(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overwrites the file at `path` with this document.
    ///
    /// The file is truncated and rewritten in place.
    pub fn write(&self, path: &Path, format: Format) -> Result<(), Error> {
        let io_error = |source: io::Error| Error::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        let result = match format {
            Format::Compact => serde_json::to_writer(&mut writer, self),
            Format::Pretty => serde_json::to_writer_pretty(&mut writer, self),
        };
        result.map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(io_error)
    }

    pub fn issue(&self, id: IssueId) -> Result<&IssueRecord, Error> {
        self.issues
            .iter()
            .find(|issue| issue.id == id)
            .ok_or(Error::IssueNotFound(id))
    }

    pub fn issue_mut(&mut self, id: IssueId) -> Result<&mut IssueRecord, Error> {
        self.issues
            .iter_mut()
            .find(|issue| issue.id == id)
            .ok_or(Error::IssueNotFound(id))
    }

    pub fn version(&self, id: VersionId) -> Result<&VersionRecord, Error> {
        self.versions
            .iter()
            .find(|version| version.id == id)
            .ok_or(Error::VersionNotFound(id))
    }

    pub fn version_mut(&mut self, id: VersionId) -> Result<&mut VersionRecord, Error> {
        self.versions
            .iter_mut()
            .find(|version| version.id == id)
            .ok_or(Error::VersionNotFound(id))
    }

    pub fn checklist(&self, id: ChecklistId) -> Result<&ChecklistRecord, Error> {
        self.checklists
            .iter()
            .find(|checklist| checklist.id == id)
            .ok_or(Error::ChecklistNotFound(id))
    }

    pub fn checklist_mut(&mut self, id: ChecklistId) -> Result<&mut ChecklistRecord, Error> {
        self.checklists
            .iter_mut()
            .find(|checklist| checklist.id == id)
            .ok_or(Error::ChecklistNotFound(id))
    }

    pub fn checklist_item(&self, id: ChecklistItemId) -> Result<&ChecklistItemRecord, Error> {
        self.checklist_items
            .iter()
            .find(|item| item.id == id)
            .ok_or(Error::ChecklistItemNotFound(id))
    }

    pub fn checklist_item_mut(
        &mut self,
        id: ChecklistItemId,
    ) -> Result<&mut ChecklistItemRecord, Error> {
        self.checklist_items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(Error::ChecklistItemNotFound(id))
    }

    /// Fails unless `version_id` is absent or names an existing version.
    pub fn check_version_reference(&self, version_id: Option<VersionId>) -> Result<(), Error> {
        match version_id {
            Some(id) => self.version(id).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Fails if any version, including the one being renamed, already uses
    /// `name`.
    pub fn check_version_name_unique(&self, name: &str) -> Result<(), Error> {
        if self.versions.iter().any(|version| version.name == name) {
            Err(Error::VersionAlreadyExists(name.to_owned()))
        } else {
            Ok(())
        }
    }

    /// The id for a new issue.
    pub fn next_issue_id(&self) -> Result<IssueId, Error> {
        next_id(self.issues.iter().map(|i| i.id), IssueId::FIRST, IssueId::next)
            .ok_or(Error::IdsExhausted("issue"))
    }

    pub fn next_version_id(&self) -> Result<VersionId, Error> {
        next_id(
            self.versions.iter().map(|v| v.id),
            VersionId::FIRST,
            VersionId::next,
        )
        .ok_or(Error::IdsExhausted("version"))
    }

    pub fn next_checklist_id(&self) -> Result<ChecklistId, Error> {
        next_id(
            self.checklists.iter().map(|c| c.id),
            ChecklistId::FIRST,
            ChecklistId::next,
        )
        .ok_or(Error::IdsExhausted("checklist"))
    }

    pub fn next_checklist_item_id(&self) -> Result<ChecklistItemId, Error> {
        next_id(
            self.checklist_items.iter().map(|i| i.id),
            ChecklistItemId::FIRST,
            ChecklistItemId::next,
        )
        .ok_or(Error::IdsExhausted("checklist item"))
    }

    /// Advances the updated timestamp of an issue.
    pub fn touch_issue(&mut self, id: IssueId) -> Result<(), Error> {
        let issue = self.issue_mut(id)?;
        issue.updated_date_time = advance(issue.updated_date_time);
        Ok(())
    }

    /// Advances the updated timestamp of the issue that owns a checklist.
    pub fn touch_checklist_owner(&mut self, id: ChecklistId) -> Result<(), Error> {
        let issue_id = self.checklist(id)?.issue_id;
        self.touch_issue(issue_id)
    }

    pub fn hydrate_issue(&self, issue: &IssueRecord) -> Result<Issue, Error> {
        let version = issue
            .version_id
            .map(|id| self.version(id).map(VersionRecord::to_version))
            .transpose()?;

        Ok(Issue {
            id: issue.id,
            title: issue.title.clone(),
            description: issue.description.clone(),
            status: issue.status.clone(),
            created_date_time: issue.created_date_time,
            updated_date_time: issue.updated_date_time,
            version,
        })
    }

    pub fn items_of(&self, checklist_id: ChecklistId) -> impl Iterator<Item = ChecklistItem> + '_ {
        self.checklist_items
            .iter()
            .filter(move |item| item.checklist_id == checklist_id)
            .map(ChecklistItemRecord::to_item)
    }

    pub fn hydrate_checklist(&self, checklist: &ChecklistRecord) -> Checklist {
        Checklist {
            id: checklist.id,
            issue_id: checklist.issue_id,
            title: checklist.title.clone(),
            items: self.items_of(checklist.id).collect(),
        }
    }
}

impl VersionRecord {
    pub fn to_version(&self) -> Version {
        Version {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

impl ChecklistItemRecord {
    pub fn to_item(&self) -> ChecklistItem {
        ChecklistItem {
            id: self.id,
            checklist_id: self.checklist_id,
            content: self.content.clone(),
            is_checked: self.is_checked,
        }
    }
}

/// Returns the current time, or a nanosecond after `previous` if the clock
/// has not moved past it.
pub fn advance(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + TimeDelta::nanoseconds(1)
    }
}
