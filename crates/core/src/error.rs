#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid subscription tier: {0}")]
    InvalidTier(String),

    #[error("Unknown subscription tier: {0}")]
    UnknownTier(String),

    #[error("Stale usage counter: {0}")]
    Stale(String),
}
