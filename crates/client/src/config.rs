/// Connection settings for the external backend, loaded from
/// environment variables by whichever transport implements the
/// provider traits.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend project.
    pub api_url: String,
    /// Publishable (anonymous) API key.
    pub api_key: String,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var             | Required |
    /// |---------------------|----------|
    /// | `AGENTDESK_API_URL` | **yes**  |
    /// | `AGENTDESK_API_KEY` | **yes**  |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is not set or is empty. Call this
    /// once at startup.
    pub fn from_env() -> Self {
        let api_url = std::env::var("AGENTDESK_API_URL")
            .expect("AGENTDESK_API_URL must be set in the environment");
        assert!(!api_url.is_empty(), "AGENTDESK_API_URL must not be empty");

        let api_key = std::env::var("AGENTDESK_API_KEY")
            .expect("AGENTDESK_API_KEY must be set in the environment");
        assert!(!api_key.is_empty(), "AGENTDESK_API_KEY must not be empty");

        Self { api_url, api_key }
    }
}
