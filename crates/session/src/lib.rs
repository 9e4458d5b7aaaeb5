//! Stateful session and subscription layer for the agentdesk client.
//!
//! - [`SessionStore`] — the authentication state machine. Holds at most
//!   one current identity, serializes sign-in/sign-out against the
//!   external identity provider, and applies asynchronous
//!   session-change notifications.
//! - [`SessionBus`] — in-process fan-out of session changes to local
//!   listeners.
//! - [`SubscriptionService`] — subscription, entitlement, and usage
//!   queries for the current identity, combining the session store,
//!   the data/RPC providers, and the pure evaluator in
//!   `agentdesk_core`.

pub mod events;
pub mod store;
pub mod subscription;

pub use events::{SessionBus, SessionEvent};
pub use store::{SessionState, SessionStore};
pub use subscription::SubscriptionService;
