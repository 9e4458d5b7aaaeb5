//! Pure domain logic for the agentdesk desktop client.
//!
//! This crate holds the session/entitlement core that the rest of the
//! client builds on:
//!
//! - [`tier`] — the static subscription tier catalog (limits, features,
//!   billing-page comparison data).
//! - [`subscription`] — the [`SubscriptionRecord`](subscription::SubscriptionRecord)
//!   read from the backing store.
//! - [`entitlement`] — pure policy evaluation (expiration, quota,
//!   feature checks, upgrade transitions).
//! - [`usage`] — task-count aggregation into display-ready snapshots.
//!
//! Nothing in this crate performs I/O. All functions are safe to call
//! concurrently from any number of callers.

pub mod entitlement;
pub mod error;
pub mod subscription;
pub mod tier;
pub mod types;
pub mod usage;
