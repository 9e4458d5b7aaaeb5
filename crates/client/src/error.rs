use agentdesk_core::error::CoreError;

/// Opaque failure surfaced from the external backend.
///
/// Carries the backend's message verbatim; no retry or classification
/// happens at this layer.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error type for client-side session and subscription operations.
///
/// Wraps [`CoreError`] for domain errors and adds the opaque provider
/// failure. None of the client's logic throws for control flow; every
/// fallible operation returns a [`ClientResult`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A domain-level error from `agentdesk_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An opaque failure from the external backend.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Convenience alias for client operation results.
pub type ClientResult<T> = Result<T, ClientError>;
