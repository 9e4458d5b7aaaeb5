//! The three operation shapes this client depends on.
//!
//! The external identity-and-data backend is reachable only through
//! these traits: identity operations, record operations, and remote
//! procedures. No wire format is assumed beyond the call shapes;
//! persisted state layout is entirely owned by the backend. Production
//! transports implement these traits outside this workspace; the test
//! suite provides an in-memory double.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::ClientResult;
use crate::models::identity::{AuthPayload, Identity, NewAccount, OAuthRedirect, UserUpdate};

/// Table names owned by the backing store.
pub mod tables {
    /// User rows, including the subscription columns.
    pub const USERS: &str = "users";
    /// Task rows.
    pub const TASKS: &str = "tasks";
    /// Subscription change history rows.
    pub const SUBSCRIPTION_HISTORY: &str = "subscription_history";
}

/// Remote procedure names exposed by the backing store.
pub mod procedures {
    /// Authoritative task-creation policy check.
    pub const CAN_CREATE_TASK: &str = "can_create_task";
    /// Resolved tier limits for a user.
    pub const GET_TIER_LIMITS: &str = "get_tier_limits";
    /// Authoritative feature check.
    pub const HAS_FEATURE: &str = "has_feature";
    /// Tier change transaction.
    pub const UPGRADE_SUBSCRIPTION: &str = "upgrade_subscription";
}

/// An asynchronous session-change notification from the identity
/// provider.
#[derive(Debug, Clone)]
pub enum AuthChange {
    /// A sign-in completed, locally or out-of-band (OAuth callback).
    SignedIn(AuthPayload),
    /// The provider rotated the session's tokens.
    TokenRefreshed(AuthPayload),
    /// The session was revoked by a confirmed sign-out.
    SignedOut,
    /// The provider declared the session invalid (refresh failure,
    /// forced expiry).
    SessionExpired,
}

/// Identity operations.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Recover the persisted session, if any.
    async fn get_session(&self) -> ClientResult<Option<AuthPayload>>;

    /// Create an account and sign in as it.
    async fn sign_up(&self, account: &NewAccount) -> ClientResult<AuthPayload>;

    /// Sign in with email + password.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> ClientResult<AuthPayload>;

    /// Begin an OAuth sign-in with the named provider.
    ///
    /// The flow completes out-of-band; a successful completion arrives
    /// later as [`AuthChange::SignedIn`] on the notification channel.
    async fn sign_in_with_oauth(
        &self,
        provider_id: &str,
        redirect_target: &str,
    ) -> ClientResult<OAuthRedirect>;

    /// Revoke the current session. The caller must not clear local
    /// state until this confirms.
    async fn sign_out(&self) -> ClientResult<()>;

    /// Send a password-reset email.
    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_target: &str,
    ) -> ClientResult<()>;

    /// Update the authenticated user's profile or credentials,
    /// returning the replacement identity.
    async fn update_user(&self, update: &UserUpdate) -> ClientResult<Identity>;

    /// Subscribe to session-change notifications.
    ///
    /// This is the single channel by which asynchronous session
    /// invalidation reaches the client; there is no polling.
    fn auth_changes(&self) -> broadcast::Receiver<AuthChange>;
}

/// Sort order for [`DataProvider::query`].
#[derive(Debug, Clone, Copy)]
pub struct Order {
    pub column: &'static str,
    pub descending: bool,
}

/// Record operations against the backing store.
///
/// Filters are conjunctions of column equality tests.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Fetch exactly one row matching the filter.
    async fn fetch_one(&self, table: &str, filter: &[(&str, Value)]) -> ClientResult<Value>;

    /// Insert a row, returning it as stored.
    async fn insert(&self, table: &str, values: Value) -> ClientResult<Value>;

    /// Update rows matching the filter, returning the updated row.
    async fn update(
        &self,
        table: &str,
        filter: &[(&str, Value)],
        values: Value,
    ) -> ClientResult<Value>;

    /// Fetch all rows matching the filter.
    async fn query(
        &self,
        table: &str,
        filter: &[(&str, Value)],
        order: Option<Order>,
    ) -> ClientResult<Vec<Value>>;
}

/// Remote procedure operations.
///
/// These encapsulate server-side policy checks that mirror, and in
/// production take precedence over, the client-side evaluator in
/// `agentdesk_core`. The local evaluator exists for responsive UI and
/// is advisory, not authoritative.
#[async_trait]
pub trait RpcProvider: Send + Sync {
    async fn invoke(&self, procedure: &str, args: Value) -> ClientResult<Value>;
}
