//! Typed repository layer over the record interface.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept the data provider as the first argument.

pub mod subscription_repo;
pub mod task_repo;

pub use subscription_repo::SubscriptionRepo;
pub use task_repo::TaskRepo;

use serde::de::DeserializeOwned;

use crate::error::{ClientResult, ProviderError};

/// Decode a row, mapping malformed payloads to a boundary error.
///
/// The backend owns the row layout; a shape mismatch is surfaced as a
/// provider failure, logged here and returned unchanged.
pub(crate) fn decode_row<T: DeserializeOwned>(
    table: &str,
    row: serde_json::Value,
) -> ClientResult<T> {
    serde_json::from_value(row).map_err(|e| {
        tracing::warn!(table, error = %e, "Malformed row from backing store");
        ProviderError::new(format!("malformed {table} row: {e}")).into()
    })
}
