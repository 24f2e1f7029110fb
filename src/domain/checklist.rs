use serde::{Deserialize, Serialize};

use crate::domain::{ChecklistId, ChecklistItemId, IssueId};

/// A titled list of items attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    /// Identifier, assigned on creation.
    pub id: ChecklistId,
    /// The issue that owns this checklist.
    pub issue_id: IssueId,
    /// Heading shown above the items.
    pub title: String,
    /// The checklist's items, in storage order.
    pub items: Vec<ChecklistItem>,
}

impl Checklist {
    /// Number of items that are checked.
    #[must_use]
    pub fn checked_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_checked).count()
    }
}

/// A single entry in a checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    /// Identifier, assigned on creation.
    pub id: ChecklistItemId,
    /// The checklist this item belongs to.
    pub checklist_id: ChecklistId,
    /// Text of the item.
    pub content: String,
    /// Whether the item has been ticked off.
    pub is_checked: bool,
}
