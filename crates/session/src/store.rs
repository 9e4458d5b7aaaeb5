//! The authentication state machine.
//!
//! A [`SessionStore`] holds at most one current identity. All mutating
//! operations are short-lived request/response calls against the
//! external identity provider; the last completed attempt wins.
//! Asynchronous invalidation (token refresh, forced expiry) arrives
//! exclusively through the provider's notification channel and is
//! applied by the task spawned in
//! [`start_change_listener`](SessionStore::start_change_listener).

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use agentdesk_client::error::{ClientResult, ProviderError};
use agentdesk_client::models::identity::{
    AuthPayload, AuthSession, Identity, NewAccount, OAuthRedirect, UserUpdate,
};
use agentdesk_client::provider::{AuthChange, IdentityProvider};
use agentdesk_core::error::CoreError;

use crate::events::{SessionBus, SessionEvent};

/// Deep link the OAuth flow returns to once the external browser step
/// completes.
const OAUTH_REDIRECT_TARGET: &str = "agentdesk://auth/callback";

/// Deep link the password-reset email points at.
const RESET_REDIRECT_TARGET: &str = "agentdesk://auth/reset-password";

/// Authentication state of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No current identity.
    Unauthenticated,
    /// A sign-in or sign-up call is in flight.
    Authenticating,
    /// One current identity with a live session.
    Authenticated {
        identity: Identity,
        session: AuthSession,
    },
    /// The provider declared the last session invalid.
    Expired,
}

/// Holds the current identity and session and drives all transitions
/// between the [`SessionState`]s.
pub struct SessionStore {
    provider: Arc<dyn IdentityProvider>,
    state: RwLock<SessionState>,
    bus: SessionBus,
}

impl SessionStore {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            state: RwLock::new(SessionState::Unauthenticated),
            bus: SessionBus::default(),
        }
    }

    // -----------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------

    /// Attempt to recover a persisted session from the identity
    /// provider.
    ///
    /// Moves to `Authenticated` on success and `Unauthenticated` on
    /// absence. A provider failure is surfaced in the result while the
    /// state falls back to `Unauthenticated`; it is not treated as a
    /// confirmed sign-out.
    pub async fn initialize(&self) -> ClientResult<SessionState> {
        match self.provider.get_session().await {
            Ok(Some(payload)) => {
                self.adopt(payload).await?;
                Ok(self.state().await)
            }
            Ok(None) => {
                *self.state.write().await = SessionState::Unauthenticated;
                Ok(SessionState::Unauthenticated)
            }
            Err(e) => {
                tracing::error!(error = %e, "Session recovery failed");
                *self.state.write().await = SessionState::Unauthenticated;
                Err(e)
            }
        }
    }

    /// Create an account and sign in as it.
    pub async fn sign_up(&self, account: &NewAccount) -> ClientResult<Identity> {
        let previous = self.begin_attempt().await;
        let result = self.provider.sign_up(account).await;
        self.finish_attempt(previous, result).await
    }

    /// Sign in with email + password.
    ///
    /// Either transitions to `Authenticated` with a fresh identity and
    /// session, or returns the error with the previous state restored.
    /// There is no partial authentication.
    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<Identity> {
        let previous = self.begin_attempt().await;
        let result = self.provider.sign_in_with_password(email, password).await;
        self.finish_attempt(previous, result).await
    }

    /// Begin an OAuth sign-in with the named provider.
    ///
    /// Local state is untouched: the flow completes out-of-band and a
    /// successful completion arrives as a [`AuthChange::SignedIn`]
    /// notification.
    pub async fn sign_in_with_provider(&self, provider_id: &str) -> ClientResult<OAuthRedirect> {
        self.provider
            .sign_in_with_oauth(provider_id, OAUTH_REDIRECT_TARGET)
            .await
    }

    /// Sign out.
    ///
    /// The provider must confirm revocation before local state clears.
    /// On failure the session stays as-is, so the client never believes
    /// it is signed out while a server-side session remains valid.
    pub async fn sign_out(&self) -> ClientResult<()> {
        self.provider.sign_out().await?;
        *self.state.write().await = SessionState::Unauthenticated;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Send a password-reset email. Does not require a session.
    pub async fn reset_password(&self, email: &str) -> ClientResult<()> {
        self.provider
            .reset_password_for_email(email, RESET_REDIRECT_TARGET)
            .await
    }

    // -----------------------------------------------------------------
    // Profile
    // -----------------------------------------------------------------

    /// Update the current user's profile, replacing the stored identity
    /// wholesale.
    pub async fn update_profile(&self, update: &UserUpdate) -> ClientResult<Identity> {
        // 1. Require a current identity.
        if !self.is_authenticated().await {
            return Err(CoreError::NotAuthenticated.into());
        }

        // 2. Apply at the provider.
        let identity = self.provider.update_user(update).await?;

        // 3. Replace the stored identity.
        let mut state = self.state.write().await;
        if let SessionState::Authenticated {
            identity: current, ..
        } = &mut *state
        {
            *current = identity.clone();
        }
        Ok(identity)
    }

    /// Change the current user's password.
    pub async fn change_password(&self, new_password: &str) -> ClientResult<()> {
        if !self.is_authenticated().await {
            return Err(CoreError::NotAuthenticated.into());
        }

        let update = UserUpdate {
            password: Some(new_password.to_string()),
            ..Default::default()
        };
        self.provider.update_user(&update).await?;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// The current identity, if authenticated.
    pub async fn current_identity(&self) -> Option<Identity> {
        match &*self.state.read().await {
            SessionState::Authenticated { identity, .. } => Some(identity.clone()),
            _ => None,
        }
    }

    /// The current session, if authenticated.
    pub async fn current_session(&self) -> Option<AuthSession> {
        match &*self.state.read().await {
            SessionState::Authenticated { session, .. } => Some(session.clone()),
            _ => None,
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(
            &*self.state.read().await,
            SessionState::Authenticated { .. }
        )
    }

    /// A snapshot of the current state.
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    // -----------------------------------------------------------------
    // Change notifications
    // -----------------------------------------------------------------

    /// Register a listener for session changes.
    ///
    /// Events are delivered in the order they are applied; this is the
    /// single channel by which asynchronous session invalidation
    /// reaches the rest of the system.
    pub fn on_session_change(&self) -> broadcast::Receiver<SessionEvent> {
        self.bus.subscribe()
    }

    /// Spawn the task that applies provider notifications to local
    /// state and republishes them to [`on_session_change`](Self::on_session_change)
    /// subscribers.
    ///
    /// No ordering guarantee exists between a local mutating call's own
    /// completion and a notification it triggers; both are eventually
    /// consistent.
    pub fn start_change_listener(store: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::clone(store);
        let mut changes = store.provider.auth_changes();
        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => store.apply_change(change).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Session change listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Apply one provider notification, then republish it locally.
    async fn apply_change(&self, change: AuthChange) {
        {
            let mut state = self.state.write().await;
            match &change {
                AuthChange::SignedIn(payload) | AuthChange::TokenRefreshed(payload) => {
                    if payload.is_consistent() {
                        *state = SessionState::Authenticated {
                            identity: payload.identity.clone(),
                            session: payload.session.clone(),
                        };
                    } else {
                        tracing::warn!(
                            user_id = %payload.identity.id,
                            "Ignoring session notification with mismatched identity"
                        );
                    }
                }
                AuthChange::SignedOut => *state = SessionState::Unauthenticated,
                AuthChange::SessionExpired => {
                    tracing::info!("Session expired");
                    *state = SessionState::Expired;
                }
            }
        }

        self.bus.publish(SessionEvent {
            change,
            timestamp: Utc::now(),
        });
    }

    // -----------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------

    /// Mark an authentication attempt in flight, returning the state to
    /// restore should it fail.
    async fn begin_attempt(&self) -> SessionState {
        let mut state = self.state.write().await;
        std::mem::replace(&mut *state, SessionState::Authenticating)
    }

    /// Resolve an authentication attempt.
    ///
    /// On success the new session replaces whatever is current (the
    /// last completed attempt wins). On failure the previous state is
    /// restored, unless another attempt has completed in the meantime.
    async fn finish_attempt(
        &self,
        previous: SessionState,
        result: ClientResult<AuthPayload>,
    ) -> ClientResult<Identity> {
        let error = match result {
            Ok(payload) if payload.is_consistent() => return self.adopt(payload).await,
            Ok(payload) => ProviderError::new(format!(
                "session user {} does not match identity {}",
                payload.session.user_id, payload.identity.id
            ))
            .into(),
            Err(e) => e,
        };

        tracing::warn!(error = %error, "Authentication attempt failed");
        let mut state = self.state.write().await;
        if *state == SessionState::Authenticating {
            *state = previous;
        }
        Err(error)
    }

    /// Install a payload as the current session.
    async fn adopt(&self, payload: AuthPayload) -> ClientResult<Identity> {
        // The provider must hand back a session for the identity it names.
        if !payload.is_consistent() {
            *self.state.write().await = SessionState::Unauthenticated;
            return Err(ProviderError::new(format!(
                "session user {} does not match identity {}",
                payload.session.user_id, payload.identity.id
            ))
            .into());
        }

        let identity = payload.identity.clone();
        *self.state.write().await = SessionState::Authenticated {
            identity: payload.identity,
            session: payload.session,
        };
        tracing::info!(user_id = %identity.id, "Session established");
        Ok(identity)
    }
}
