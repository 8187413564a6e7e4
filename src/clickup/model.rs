//! Wire representation of ClickUp tasks and users.

use serde::{Deserialize, Serialize};

use crate::types::Task;

/// A task as the ClickUp API returns it.
///
/// Timestamps are string-encoded epoch millis and are carried through
/// verbatim; nothing in the panel needs them parsed.
#[derive(Debug, Clone, Deserialize)]
pub struct ClickUpTask {
    pub id: String,
    #[serde(default)]
    pub custom_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub status: ClickUpTaskStatus,
    #[serde(default)]
    pub orderindex: Option<String>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_updated: Option<String>,
    #[serde(default)]
    pub date_closed: Option<String>,
    /// Present on every record; the panel shows assignees, not the creator.
    pub creator: ClickUpUser,
    #[serde(default)]
    pub assignees: Vec<ClickUpUser>,
}

/// Status sub-record: the label plus presentation metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ClickUpTaskStatus {
    pub status: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub orderindex: i64,
    #[serde(rename = "type", default)]
    pub status_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickUpUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<ClickUpTask> for Task {
    fn from(record: ClickUpTask) -> Self {
        let owner = if record.assignees.is_empty() {
            String::new()
        } else {
            record
                .assignees
                .iter()
                .map(|assignee| assignee.username.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        Task {
            id: record.id,
            title: record.name,
            description: record.description.unwrap_or_default(),
            owner,
            status: record.status.status,
            repository: String::new(),
            can_be_linked: true,
        }
    }
}
