//! Minimal task row used for usage statistics.

use agentdesk_core::usage::TaskStatus;
use serde::Deserialize;

/// A task row projected down to its status column.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRow {
    pub status: String,
}

impl TaskRow {
    /// The parsed status. Unknown statuses map to
    /// [`TaskStatus::Other`].
    pub fn status(&self) -> TaskStatus {
        TaskStatus::parse(&self.status)
    }
}
