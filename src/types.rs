//! Shared host-facing types.

use serde::{Deserialize, Serialize};

/// A unit of trackable work as the issue panel displays it.
///
/// `Default` is the "no task" value: branch lookups that resolve to no
/// task id return it instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    /// ", "-joined assignee display names; empty when unassigned.
    pub owner: String,
    pub status: String,
    /// Not populated by this integration.
    pub repository: String,
    pub can_be_linked: bool,
}
