//! Identity and session models issued by the external identity
//! provider.

use agentdesk_core::types::{Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// An authenticated user identity.
///
/// Immutable once issued by the identity provider; re-authentication
/// and profile updates replace it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// A session issued for one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// The identity this session belongs to.
    pub user_id: UserId,
    /// Opaque refresh token blob. Never interpreted client-side.
    pub refresh_token: String,
    /// End of the validity window, if the provider reports one.
    pub expires_at: Option<Timestamp>,
}

/// Identity + session pair returned by authentication operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthPayload {
    pub identity: Identity,
    pub session: AuthSession,
}

impl AuthPayload {
    /// Whether the session actually references the identity.
    pub fn is_consistent(&self) -> bool {
        self.identity.id == self.session.user_id
    }
}

/// DTO for creating a new account.
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// DTO for updating the authenticated user. All fields are optional.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    /// New password, when changing credentials.
    pub password: Option<String>,
}

/// Where to send the user to complete an OAuth sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthRedirect {
    pub provider_id: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn payload_consistency_checks_user_id() {
        let id = Uuid::new_v4();
        let identity = Identity {
            id,
            email: "a@b.test".into(),
            full_name: None,
            avatar_url: None,
        };
        let session = AuthSession {
            user_id: id,
            refresh_token: "opaque".into(),
            expires_at: None,
        };
        let payload = AuthPayload {
            identity: identity.clone(),
            session: session.clone(),
        };
        assert!(payload.is_consistent());

        let mismatched = AuthPayload {
            identity,
            session: AuthSession {
                user_id: Uuid::new_v4(),
                ..session
            },
        };
        assert!(!mismatched.is_consistent());
    }
}
