//! Shared in-memory backend double for session-layer tests.
//!
//! Policy procedures run the same evaluation as `agentdesk_core` over
//! the rows held here, so the advisory client-side answers and the
//! "server-side" answers can be compared directly in tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tokio::sync::broadcast;
use uuid::Uuid;

use agentdesk_client::error::{ClientResult, ProviderError};
use agentdesk_client::models::identity::{
    AuthPayload, AuthSession, Identity, NewAccount, OAuthRedirect, UserUpdate,
};
use agentdesk_client::provider::{
    procedures, tables, AuthChange, DataProvider, IdentityProvider, Order, RpcProvider,
};
use agentdesk_core::entitlement;
use agentdesk_core::subscription::SubscriptionRecord;
use agentdesk_core::tier::Tier;

/// In-memory stand-in for the external identity-and-data backend.
pub struct MockBackend {
    changes: broadcast::Sender<AuthChange>,
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    /// email -> (password, identity)
    accounts: HashMap<String, (String, Identity)>,
    /// Session recovered by `get_session`.
    persisted: Option<AuthPayload>,
    /// Rows per table.
    rows: HashMap<String, Vec<Value>>,
    /// When set, the next identity operation fails with this message.
    fail_identity: Option<String>,
    /// Procedure names in invocation order.
    rpc_calls: Vec<String>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(32);
        Self {
            changes,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Register an account and return its identity.
    pub fn add_account(&self, email: &str, password: &str) -> Identity {
        let identity = Identity {
            id: Uuid::new_v4(),
            email: email.to_string(),
            full_name: None,
            avatar_url: None,
        };
        self.state.lock().unwrap().accounts.insert(
            email.to_string(),
            (password.to_string(), identity.clone()),
        );
        identity
    }

    /// Store a session for `get_session` to recover.
    pub fn persist_session(&self, payload: AuthPayload) {
        self.state.lock().unwrap().persisted = Some(payload);
    }

    /// Append a raw row to a table.
    pub fn put_row(&self, table: &str, row: Value) {
        self.state
            .lock()
            .unwrap()
            .rows
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    /// Seed the subscription columns of a `users` row.
    pub fn seed_user_row(
        &self,
        user_id: Uuid,
        tier: &str,
        expires_at: Option<&str>,
        tasks_used_today: u32,
        tasks_reset_date: &str,
    ) {
        self.put_row(
            tables::USERS,
            json!({
                "id": user_id,
                "subscription_tier": tier,
                "subscription_expires_at": expires_at,
                "tasks_used_today": tasks_used_today,
                "tasks_reset_date": tasks_reset_date,
            }),
        );
    }

    /// Make the next identity operation fail with this message.
    pub fn fail_next_identity_op(&self, message: &str) {
        self.state.lock().unwrap().fail_identity = Some(message.to_string());
    }

    /// Simulate an out-of-band notification from the provider.
    pub fn emit(&self, change: AuthChange) {
        let _ = self.changes.send(change);
    }

    /// Procedure names invoked so far.
    pub fn rpc_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().rpc_calls.clone()
    }

    fn take_failure(state: &mut MockState) -> Result<(), ProviderError> {
        match state.fail_identity.take() {
            Some(message) => Err(ProviderError::new(message)),
            None => Ok(()),
        }
    }

    fn subscription_record(
        state: &MockState,
        user_id: Uuid,
    ) -> Result<SubscriptionRecord, ProviderError> {
        let row = state
            .rows
            .get(tables::USERS)
            .and_then(|rows| rows.iter().find(|row| row["id"] == json!(user_id)))
            .cloned()
            .ok_or_else(|| ProviderError::new("user not found"))?;
        serde_json::from_value(row)
            .map_err(|e| ProviderError::new(format!("malformed users row: {e}")))
    }
}

/// Build a session payload for an identity.
pub fn payload_for(identity: &Identity) -> AuthPayload {
    AuthPayload {
        identity: identity.clone(),
        session: AuthSession {
            user_id: identity.id,
            refresh_token: format!("rt-{}", Uuid::new_v4()),
            expires_at: None,
        },
    }
}

/// An ISO timestamp `days` days from now.
pub fn days_from_now(days: i64) -> String {
    (Utc::now() + Duration::days(days)).to_rfc3339()
}

fn matches(row: &Value, filter: &[(&str, Value)]) -> bool {
    filter
        .iter()
        .all(|(column, value)| row.get(*column) == Some(value))
}

// ---------------------------------------------------------------------------
// IdentityProvider
// ---------------------------------------------------------------------------

#[async_trait]
impl IdentityProvider for MockBackend {
    async fn get_session(&self) -> ClientResult<Option<AuthPayload>> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        Ok(state.persisted.clone())
    }

    async fn sign_up(&self, account: &NewAccount) -> ClientResult<AuthPayload> {
        let payload = {
            let mut state = self.state.lock().unwrap();
            Self::take_failure(&mut state)?;

            let identity = Identity {
                id: Uuid::new_v4(),
                email: account.email.clone(),
                full_name: account.full_name.clone(),
                avatar_url: account.avatar_url.clone(),
            };
            state.accounts.insert(
                account.email.clone(),
                (account.password.clone(), identity.clone()),
            );

            // New accounts start on the free tier.
            state.rows.entry(tables::USERS.to_string()).or_default().push(json!({
                "id": identity.id,
                "subscription_tier": "free",
                "subscription_expires_at": null,
                "tasks_used_today": 0,
                "tasks_reset_date": days_from_now(1),
            }));

            let payload = payload_for(&identity);
            state.persisted = Some(payload.clone());
            payload
        };
        let _ = self.changes.send(AuthChange::SignedIn(payload.clone()));
        Ok(payload)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> ClientResult<AuthPayload> {
        let payload = {
            let mut state = self.state.lock().unwrap();
            Self::take_failure(&mut state)?;

            let (stored_password, identity) = state
                .accounts
                .get(email)
                .cloned()
                .ok_or_else(|| ProviderError::new("Invalid login credentials"))?;
            if stored_password != password {
                return Err(ProviderError::new("Invalid login credentials").into());
            }

            let payload = payload_for(&identity);
            state.persisted = Some(payload.clone());
            payload
        };
        let _ = self.changes.send(AuthChange::SignedIn(payload.clone()));
        Ok(payload)
    }

    async fn sign_in_with_oauth(
        &self,
        provider_id: &str,
        redirect_target: &str,
    ) -> ClientResult<OAuthRedirect> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        Ok(OAuthRedirect {
            provider_id: provider_id.to_string(),
            url: format!(
                "https://auth.agentdesk.test/authorize?provider={provider_id}&redirect_to={redirect_target}"
            ),
        })
    }

    async fn sign_out(&self) -> ClientResult<()> {
        {
            let mut state = self.state.lock().unwrap();
            Self::take_failure(&mut state)?;
            state.persisted = None;
        }
        let _ = self.changes.send(AuthChange::SignedOut);
        Ok(())
    }

    async fn reset_password_for_email(
        &self,
        _email: &str,
        _redirect_target: &str,
    ) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        Ok(())
    }

    async fn update_user(&self, update: &UserUpdate) -> ClientResult<Identity> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;

        let identity = {
            let payload = state
                .persisted
                .as_mut()
                .ok_or_else(|| ProviderError::new("Auth session missing"))?;
            if let Some(full_name) = &update.full_name {
                payload.identity.full_name = Some(full_name.clone());
            }
            if let Some(avatar_url) = &update.avatar_url {
                payload.identity.avatar_url = Some(avatar_url.clone());
            }
            payload.identity.clone()
        };

        if let Some((password, stored)) = state.accounts.get_mut(&identity.email) {
            *stored = identity.clone();
            if let Some(new_password) = &update.password {
                *password = new_password.clone();
            }
        }
        Ok(identity)
    }

    fn auth_changes(&self) -> broadcast::Receiver<AuthChange> {
        self.changes.subscribe()
    }
}

// ---------------------------------------------------------------------------
// DataProvider
// ---------------------------------------------------------------------------

#[async_trait]
impl DataProvider for MockBackend {
    async fn fetch_one(&self, table: &str, filter: &[(&str, Value)]) -> ClientResult<Value> {
        let state = self.state.lock().unwrap();
        let row = state
            .rows
            .get(table)
            .and_then(|rows| rows.iter().find(|row| matches(row, filter)))
            .cloned()
            .ok_or_else(|| ProviderError::new(format!("no row in {table} matches filter")))?;
        Ok(row)
    }

    async fn insert(&self, table: &str, values: Value) -> ClientResult<Value> {
        self.put_row(table, values.clone());
        Ok(values)
    }

    async fn update(
        &self,
        table: &str,
        filter: &[(&str, Value)],
        values: Value,
    ) -> ClientResult<Value> {
        let mut state = self.state.lock().unwrap();
        let rows = state
            .rows
            .get_mut(table)
            .ok_or_else(|| ProviderError::new(format!("no such table: {table}")))?;

        let mut updated = None;
        for row in rows.iter_mut().filter(|row| matches(row, filter)) {
            if let (Some(target), Some(patch)) = (row.as_object_mut(), values.as_object()) {
                for (key, value) in patch {
                    target.insert(key.clone(), value.clone());
                }
            }
            updated = Some(row.clone());
        }
        updated.ok_or_else(|| ProviderError::new(format!("no row in {table} matches filter")).into())
    }

    async fn query(
        &self,
        table: &str,
        filter: &[(&str, Value)],
        order: Option<Order>,
    ) -> ClientResult<Vec<Value>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<Value> = state
            .rows
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches(row, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = order {
            rows.sort_by_key(|row| row[order.column].to_string());
            if order.descending {
                rows.reverse();
            }
        }
        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// RpcProvider
// ---------------------------------------------------------------------------

#[async_trait]
impl RpcProvider for MockBackend {
    async fn invoke(&self, procedure: &str, args: Value) -> ClientResult<Value> {
        let mut state = self.state.lock().unwrap();
        state.rpc_calls.push(procedure.to_string());

        let user_id: Uuid = serde_json::from_value(args["user_uuid"].clone())
            .map_err(|e| ProviderError::new(format!("bad user_uuid: {e}")))?;

        match procedure {
            procedures::CAN_CREATE_TASK => {
                let record = Self::subscription_record(&state, user_id)?;
                Ok(json!(entitlement::can_create_task(
                    &record,
                    record.tier.limits(),
                    Utc::now()
                )))
            }
            procedures::HAS_FEATURE => {
                let feature = args["feature_name"]
                    .as_str()
                    .ok_or_else(|| ProviderError::new("missing feature_name"))?;
                let record = Self::subscription_record(&state, user_id)?;
                Ok(json!(entitlement::has_feature(record.tier.limits(), feature)))
            }
            procedures::GET_TIER_LIMITS => {
                let record = Self::subscription_record(&state, user_id)?;
                Ok(serde_json::to_value(record.tier.limits())
                    .expect("static tier limits serialize"))
            }
            procedures::UPGRADE_SUBSCRIPTION => {
                let new_tier = args["new_tier"].as_str().unwrap_or_default();
                let tier = Tier::parse(new_tier)
                    .map_err(|_| ProviderError::new("Invalid subscription tier"))?;

                let previous = Self::subscription_record(&state, user_id)?.tier;
                let row = state
                    .rows
                    .get_mut(tables::USERS)
                    .and_then(|rows| rows.iter_mut().find(|row| row["id"] == json!(user_id)))
                    .ok_or_else(|| ProviderError::new("user not found"))?;
                row["subscription_tier"] = json!(tier.as_str());
                row["subscription_expires_at"] = args["expires_at"].clone();

                state
                    .rows
                    .entry(tables::SUBSCRIPTION_HISTORY.to_string())
                    .or_default()
                    .push(json!({
                        "user_id": user_id,
                        "previous_tier": previous.as_str(),
                        "new_tier": tier.as_str(),
                        "changed_at": Utc::now().to_rfc3339(),
                    }));
                Ok(json!(true))
            }
            other => Err(ProviderError::new(format!("unknown procedure: {other}")).into()),
        }
    }
}
