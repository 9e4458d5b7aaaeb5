//! Task status aggregation over the record interface.

use agentdesk_core::types::UserId;
use agentdesk_core::usage::TaskStatusCounts;
use serde_json::json;

use crate::error::ClientResult;
use crate::models::task::TaskRow;
use crate::provider::{tables, DataProvider};
use crate::repositories::decode_row;

/// Read access to a user's task rows.
pub struct TaskRepo;

impl TaskRepo {
    /// Count a user's tasks by status.
    pub async fn status_counts<P>(provider: &P, user_id: UserId) -> ClientResult<TaskStatusCounts>
    where
        P: DataProvider + ?Sized,
    {
        let rows = provider
            .query(tables::TASKS, &[("user_id", json!(user_id))], None)
            .await?;

        let mut counts = TaskStatusCounts::default();
        for row in rows {
            let task: TaskRow = decode_row(tables::TASKS, row)?;
            counts.record(task.status());
        }
        Ok(counts)
    }
}
