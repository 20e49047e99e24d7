use std::time::Duration;

use secrecy::SecretString;

/// Default Discord REST API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://discord.com/api/v10";

/// Configuration for the Discord client.
pub struct DiscordConfig {
    /// REST API base URL, without a trailing slash.
    pub api_base_url: String,

    /// Bot token used for channel reads and uploads.
    pub bot_token: SecretString,

    /// Application ID used to address interaction follow-ups.
    pub application_id: String,

    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("api_base_url", &self.api_base_url)
            .field("bot_token", &"[REDACTED]")
            .field("application_id", &self.application_id)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl DiscordConfig {
    /// Create a new configuration with the given bot token and application ID.
    pub fn new(bot_token: impl Into<String>, application_id: impl Into<String>) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            bot_token: SecretString::new(bot_token.into()),
            application_id: application_id.into(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Point the client at a different API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
