//! Usage statistics: task counts by status, aggregated into a
//! display-ready snapshot.

use serde::{Deserialize, Serialize};

use crate::entitlement;
use crate::subscription::SubscriptionRecord;
use crate::tier::TierLimits;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Task status
// ---------------------------------------------------------------------------

/// Lifecycle status of a task as reported by the backing store.
///
/// Statuses outside the three named ones (e.g. `pending`, `cancelled`)
/// fold into [`Other`](TaskStatus::Other) and are counted only in the
/// total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
    Failed,
    Running,
    #[serde(other)]
    Other,
}

impl TaskStatus {
    /// Parse a wire status string. Unknown statuses map to `Other`.
    pub fn parse(status: &str) -> Self {
        match status {
            "completed" => TaskStatus::Completed,
            "failed" => TaskStatus::Failed,
            "running" => TaskStatus::Running,
            _ => TaskStatus::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// Counts
// ---------------------------------------------------------------------------

/// Task counts grouped by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStatusCounts {
    pub completed: u32,
    pub failed: u32,
    pub running: u32,
    /// Every task regardless of status.
    pub total: u32,
}

impl TaskStatusCounts {
    /// Count tasks by status.
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = TaskStatus>,
    {
        let mut counts = Self::default();
        for status in statuses {
            counts.record(status);
        }
        counts
    }

    /// Add one task to the tally.
    pub fn record(&mut self, status: TaskStatus) {
        self.total += 1;
        match status {
            TaskStatus::Completed => self.completed += 1,
            TaskStatus::Failed => self.failed += 1,
            TaskStatus::Running => self.running += 1,
            TaskStatus::Other => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Point-in-time usage summary for display and policy checks.
///
/// Derived and non-persistent: recomputed on demand, never cached
/// beyond a single query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSnapshot {
    pub subscription: SubscriptionRecord,
    pub limits: &'static TierLimits,
    /// Tasks used today with staleness already applied: zero if the
    /// record's reset boundary has passed.
    pub tasks_today: u32,
    pub counts: TaskStatusCounts,
}

/// Aggregate a usage snapshot.
///
/// Pure: identical inputs yield identical snapshots.
pub fn summarize(
    record: &SubscriptionRecord,
    limits: &'static TierLimits,
    counts: TaskStatusCounts,
    now: Timestamp,
) -> UsageSnapshot {
    UsageSnapshot {
        tasks_today: entitlement::effective_used_today(record, now),
        subscription: record.clone(),
        limits,
        counts,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
