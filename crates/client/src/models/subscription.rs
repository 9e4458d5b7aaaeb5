//! Subscription wire models beyond the core record.
//!
//! The current-subscription columns themselves decode straight into
//! [`agentdesk_core::subscription::SubscriptionRecord`].

use agentdesk_core::tier::Tier;
use agentdesk_core::types::{Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// One row of subscription change history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionChange {
    pub user_id: UserId,
    /// Tier before the change; `None` for the initial grant.
    pub previous_tier: Option<Tier>,
    pub new_tier: Tier,
    pub changed_at: Timestamp,
}
