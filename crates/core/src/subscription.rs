//! The subscription record read from the backing store's `users` table.

use serde::{Deserialize, Serialize};

use crate::tier::Tier;
use crate::types::{Timestamp, UserId};

/// A user's subscription state.
///
/// Belongs to exactly one identity. Read-only on the client: upgrades
/// and the daily usage reset are performed by the backing store, after
/// which the record is re-read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// The identity this record belongs to.
    #[serde(rename = "id")]
    pub user_id: UserId,

    #[serde(rename = "subscription_tier")]
    pub tier: Tier,

    /// When the subscription lapses. `None` means it never expires.
    #[serde(rename = "subscription_expires_at", default)]
    pub expires_at: Option<Timestamp>,

    /// Tasks started since the last daily reset. Meaningful only
    /// relative to [`tasks_reset_date`](Self::tasks_reset_date); once
    /// that boundary passes the value is stale and policy logic must
    /// treat it as zero.
    pub tasks_used_today: u32,

    /// Boundary after which `tasks_used_today` no longer counts.
    pub tasks_reset_date: Timestamp,
}
