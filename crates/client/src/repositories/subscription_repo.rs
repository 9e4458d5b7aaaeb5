//! Typed access to subscription rows.

use agentdesk_core::subscription::SubscriptionRecord;
use agentdesk_core::types::UserId;
use serde_json::json;

use crate::error::{ClientResult, ProviderError};
use crate::models::subscription::SubscriptionChange;
use crate::provider::{tables, DataProvider, Order};
use crate::repositories::decode_row;

/// Provides read access to the subscription columns of `users` rows
/// and to the subscription change history.
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Fetch the subscription record for one user.
    pub async fn fetch<P>(provider: &P, user_id: UserId) -> ClientResult<SubscriptionRecord>
    where
        P: DataProvider + ?Sized,
    {
        let row = provider
            .fetch_one(tables::USERS, &[("id", json!(user_id))])
            .await?;
        let record: SubscriptionRecord = decode_row(tables::USERS, row)?;

        // The record must belong to the identity it was fetched for.
        if record.user_id != user_id {
            tracing::warn!(
                requested = %user_id,
                received = %record.user_id,
                "Subscription row belongs to a different identity"
            );
            return Err(ProviderError::new("subscription row does not match the requested identity").into());
        }
        Ok(record)
    }

    /// Subscription change history for one user, newest first.
    pub async fn history<P>(
        provider: &P,
        user_id: UserId,
    ) -> ClientResult<Vec<SubscriptionChange>>
    where
        P: DataProvider + ?Sized,
    {
        let rows = provider
            .query(
                tables::SUBSCRIPTION_HISTORY,
                &[("user_id", json!(user_id))],
                Some(Order {
                    column: "changed_at",
                    descending: true,
                }),
            )
            .await?;

        rows.into_iter()
            .map(|row| decode_row(tables::SUBSCRIPTION_HISTORY, row))
            .collect()
    }
}
