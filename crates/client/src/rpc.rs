//! Typed wrappers for the backing store's remote procedures.
//!
//! Each procedure mirrors a client-side evaluator function in
//! `agentdesk_core::entitlement`. The remote answer is authoritative;
//! the local one exists for responsive UI and is advisory only.

use agentdesk_core::types::{Timestamp, UserId};
use serde_json::{json, Value};

use crate::error::{ClientResult, ProviderError};
use crate::provider::{procedures, RpcProvider};

/// Authoritative check whether the user may start another task.
pub async fn can_create_task<R>(rpc: &R, user_id: UserId) -> ClientResult<bool>
where
    R: RpcProvider + ?Sized,
{
    let value = rpc
        .invoke(procedures::CAN_CREATE_TASK, json!({ "user_uuid": user_id }))
        .await?;
    decode_bool(procedures::CAN_CREATE_TASK, &value)
}

/// Resolved tier limits for the user, as the backing store sees them.
pub async fn get_tier_limits<R>(rpc: &R, user_id: UserId) -> ClientResult<Value>
where
    R: RpcProvider + ?Sized,
{
    rpc.invoke(procedures::GET_TIER_LIMITS, json!({ "user_uuid": user_id }))
        .await
}

/// Authoritative check whether the user holds a feature.
pub async fn has_feature<R>(rpc: &R, user_id: UserId, feature: &str) -> ClientResult<bool>
where
    R: RpcProvider + ?Sized,
{
    let value = rpc
        .invoke(
            procedures::HAS_FEATURE,
            json!({ "user_uuid": user_id, "feature_name": feature }),
        )
        .await?;
    decode_bool(procedures::HAS_FEATURE, &value)
}

/// Apply a tier change. Returns whether the backing store accepted it.
pub async fn upgrade_subscription<R>(
    rpc: &R,
    user_id: UserId,
    new_tier: &str,
    expires_at: Option<Timestamp>,
) -> ClientResult<bool>
where
    R: RpcProvider + ?Sized,
{
    let value = rpc
        .invoke(
            procedures::UPGRADE_SUBSCRIPTION,
            json!({
                "user_uuid": user_id,
                "new_tier": new_tier,
                "expires_at": expires_at,
            }),
        )
        .await?;
    decode_bool(procedures::UPGRADE_SUBSCRIPTION, &value)
}

/// Decode a boolean procedure result, surfacing anything else as a
/// boundary error.
fn decode_bool(procedure: &str, value: &Value) -> ClientResult<bool> {
    value.as_bool().ok_or_else(|| {
        tracing::warn!(procedure, %value, "Non-boolean result from remote procedure");
        ProviderError::new(format!("non-boolean result from {procedure}")).into()
    })
}
