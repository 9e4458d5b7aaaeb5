//! Subscription, entitlement, and usage queries for the current
//! identity.

use std::sync::Arc;

use chrono::Utc;

use agentdesk_client::error::{ClientResult, ProviderError};
use agentdesk_client::models::subscription::SubscriptionChange;
use agentdesk_client::provider::{DataProvider, RpcProvider};
use agentdesk_client::repositories::{SubscriptionRepo, TaskRepo};
use agentdesk_client::rpc;
use agentdesk_core::entitlement;
use agentdesk_core::error::CoreError;
use agentdesk_core::subscription::SubscriptionRecord;
use agentdesk_core::tier::Tier;
use agentdesk_core::types::{Timestamp, UserId};
use agentdesk_core::usage::{self, UsageSnapshot};

use crate::store::SessionStore;

/// Answers subscription, entitlement, and usage questions for the
/// currently authenticated user.
///
/// Client-side answers exist for responsive UI and are advisory; the
/// backing store runs the authoritative checks through its remote
/// procedures (the `*_remote` methods here).
pub struct SubscriptionService {
    data: Arc<dyn DataProvider>,
    rpc: Arc<dyn RpcProvider>,
    store: Arc<SessionStore>,
}

impl SubscriptionService {
    pub fn new(
        data: Arc<dyn DataProvider>,
        rpc: Arc<dyn RpcProvider>,
        store: Arc<SessionStore>,
    ) -> Self {
        Self { data, rpc, store }
    }

    /// Fetch the current user's subscription record.
    pub async fn current_subscription(&self) -> ClientResult<SubscriptionRecord> {
        let user_id = self.current_user().await?;
        SubscriptionRepo::fetch(self.data.as_ref(), user_id).await
    }

    /// Change the current user's tier.
    ///
    /// The tier name is validated client-side before anything touches
    /// the wire; the record is re-read afterwards so callers see the
    /// backing store's view, not a local guess. Usage counters are left
    /// to the store and carry over unchanged.
    pub async fn upgrade(
        &self,
        new_tier: &str,
        expires_at: Option<Timestamp>,
    ) -> ClientResult<SubscriptionRecord> {
        // 1. Require a current identity.
        let user_id = self.current_user().await?;

        // 2. Reject tiers outside the enumeration.
        let tier = Tier::parse(new_tier)
            .map_err(|_| CoreError::InvalidTier(new_tier.to_string()))?;

        // 3. Run the upgrade transaction remotely.
        let accepted =
            rpc::upgrade_subscription(self.rpc.as_ref(), user_id, tier.as_str(), expires_at)
                .await?;
        if !accepted {
            return Err(ProviderError::new("upgrade rejected by the backing store").into());
        }

        // 4. Refresh: re-read the record as stored.
        let record = SubscriptionRepo::fetch(self.data.as_ref(), user_id).await?;
        tracing::info!(user_id = %user_id, tier = %record.tier, "Subscription updated");
        Ok(record)
    }

    /// Subscription change history, newest first.
    pub async fn history(&self) -> ClientResult<Vec<SubscriptionChange>> {
        let user_id = self.current_user().await?;
        SubscriptionRepo::history(self.data.as_ref(), user_id).await
    }

    /// Aggregate usage statistics for display.
    pub async fn usage_stats(&self) -> ClientResult<UsageSnapshot> {
        // 1. Current identity and subscription record.
        let user_id = self.current_user().await?;
        let record = SubscriptionRepo::fetch(self.data.as_ref(), user_id).await?;

        // 2. Task counts by status.
        let counts = TaskRepo::status_counts(self.data.as_ref(), user_id).await?;

        // 3. Resolve limits and aggregate.
        let now = Utc::now();
        if let Err(stale) = entitlement::validate_usage_window(&record, now) {
            tracing::debug!(user_id = %user_id, %stale, "Treating usage counter as reset");
        }
        Ok(usage::summarize(&record, record.tier.limits(), counts, now))
    }

    /// Advisory check whether the user may start another task.
    pub async fn can_create_task(&self) -> ClientResult<bool> {
        let record = self.current_subscription().await?;
        Ok(entitlement::can_create_task(
            &record,
            record.tier.limits(),
            Utc::now(),
        ))
    }

    /// Authoritative server-side counterpart of
    /// [`can_create_task`](Self::can_create_task).
    pub async fn can_create_task_remote(&self) -> ClientResult<bool> {
        let user_id = self.current_user().await?;
        rpc::can_create_task(self.rpc.as_ref(), user_id).await
    }

    /// Advisory feature check against the resolved tier limits.
    pub async fn has_feature(&self, feature: &str) -> ClientResult<bool> {
        let record = self.current_subscription().await?;
        Ok(entitlement::has_feature(record.tier.limits(), feature))
    }

    /// Authoritative server-side counterpart of
    /// [`has_feature`](Self::has_feature).
    pub async fn has_feature_remote(&self, feature: &str) -> ClientResult<bool> {
        let user_id = self.current_user().await?;
        rpc::has_feature(self.rpc.as_ref(), user_id, feature).await
    }

    /// The current user's id, or `NotAuthenticated`.
    async fn current_user(&self) -> ClientResult<UserId> {
        self.store
            .current_identity()
            .await
            .map(|identity| identity.id)
            .ok_or_else(|| CoreError::NotAuthenticated.into())
    }
}
