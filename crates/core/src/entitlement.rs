//! Pure entitlement evaluation over a [`SubscriptionRecord`] and the
//! tier catalog.
//!
//! Every function here is advisory on the client: the backing store
//! runs the authoritative copies of these checks server-side
//! (`can_create_task`, `has_feature`, `upgrade_subscription` remote
//! procedures). Nothing in this module performs I/O or mutates its
//! inputs.

use crate::error::CoreError;
use crate::subscription::SubscriptionRecord;
use crate::tier::{Limit, Tier, TierLimits};
use crate::types::Timestamp;

/// Milliseconds per day, for ceiling day arithmetic.
const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whether the subscription has lapsed.
///
/// True iff an expiration is set and lies strictly before `now`. A
/// record with no expiration is never expired; this covers the free
/// tier and never-expiring enterprise grants alike.
pub fn is_expired(record: &SubscriptionRecord, now: Timestamp) -> bool {
    match record.expires_at {
        Some(expires_at) => expires_at < now,
        None => false,
    }
}

/// Whole days until expiration, rounded up.
///
/// `None` if no expiration is set. Negative once the subscription has
/// already expired.
pub fn days_until_expiration(record: &SubscriptionRecord, now: Timestamp) -> Option<i64> {
    let expires_at = record.expires_at?;
    Some(ceil_days((expires_at - now).num_milliseconds()))
}

/// Ceiling division of a millisecond span into days.
fn ceil_days(ms: i64) -> i64 {
    if ms <= 0 || ms % MS_PER_DAY == 0 {
        ms / MS_PER_DAY
    } else {
        ms / MS_PER_DAY + 1
    }
}

/// The daily usage counter with staleness applied.
///
/// Returns the stored counter while `now` is still before the reset
/// boundary, and `0` afterwards. The stored record is never corrected
/// here; the actual reset is the backing store's responsibility.
pub fn effective_used_today(record: &SubscriptionRecord, now: Timestamp) -> u32 {
    if now < record.tasks_reset_date {
        record.tasks_used_today
    } else {
        0
    }
}

/// Check whether the stored usage counter is still inside its reset
/// window.
///
/// Past the boundary this fails with the non-fatal [`CoreError::Stale`]
/// so callers can log the condition; policy logic must then treat the
/// counter as zero via [`effective_used_today`].
pub fn validate_usage_window(record: &SubscriptionRecord, now: Timestamp) -> Result<(), CoreError> {
    if now < record.tasks_reset_date {
        Ok(())
    } else {
        Err(CoreError::Stale(format!(
            "reset boundary {} has passed",
            record.tasks_reset_date
        )))
    }
}

/// How many tasks may still be started today.
///
/// [`Limit::Unlimited`] exactly when the tier's daily cap is unlimited;
/// otherwise the remaining count, never negative.
pub fn remaining_tasks_today(
    record: &SubscriptionRecord,
    limits: &TierLimits,
    now: Timestamp,
) -> Limit {
    limits
        .tasks_per_day
        .remaining_after(effective_used_today(record, now))
}

/// Whether the user may start another task right now.
///
/// Requires daily quota headroom (or an unlimited cap) and a
/// non-expired subscription. A record with no expiration set bypasses
/// the expiration check regardless of tier.
pub fn can_create_task(record: &SubscriptionRecord, limits: &TierLimits, now: Timestamp) -> bool {
    !is_expired(record, now) && limits.tasks_per_day.allows(effective_used_today(record, now))
}

/// Membership test against the tier's feature set.
pub fn has_feature(limits: &TierLimits, feature: &str) -> bool {
    limits.features.contains(&feature)
}

/// The record as it would look after a tier change.
///
/// Fails with [`CoreError::InvalidTier`] if `new_tier` is outside the
/// enumeration. The expiration is caller-supplied with no defaulting;
/// usage counters carry over untouched. Downgrades are permitted.
pub fn upgrade(
    record: &SubscriptionRecord,
    new_tier: &str,
    expires_at: Option<Timestamp>,
) -> Result<SubscriptionRecord, CoreError> {
    let tier =
        Tier::parse(new_tier).map_err(|_| CoreError::InvalidTier(new_tier.to_string()))?;
    Ok(SubscriptionRecord {
        tier,
        expires_at,
        ..record.clone()
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
