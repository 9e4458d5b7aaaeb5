//! Narrow client interface to the external identity-and-data backend.
//!
//! The agentdesk client never talks to a wire protocol directly; it
//! depends on three operation shapes, defined here as traits:
//!
//! - [`provider::IdentityProvider`] — sign-up/sign-in/sign-out,
//!   session recovery, profile updates, and the session-change
//!   notification channel.
//! - [`provider::DataProvider`] — record reads/writes against the
//!   backing store's tables.
//! - [`provider::RpcProvider`] — server-side policy procedures.
//!
//! On top of the record interface, [`repositories`] offers typed access
//! to subscription and task rows, and [`rpc`] wraps the remote policy
//! procedures. Transports implementing the traits live outside this
//! workspace.

pub mod config;
pub mod error;
pub mod models;
pub mod provider;
pub mod repositories;
pub mod rpc;
