use std::time::Duration;

use archivist_discord::DiscordConfig;
use archivist_discord::config::DEFAULT_API_BASE_URL;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::ServerError;

/// Discord application credentials and REST client settings.
///
/// # Example
///
/// ```toml
/// [discord]
/// public_key = "e3b0c442..."
/// application_id = "123456789012345678"
/// request_timeout_seconds = 30
/// ```
///
/// The bot token is usually supplied through `ARCHIVIST_BOT_TOKEN` rather
/// than written to the file.
#[derive(Debug, Deserialize)]
pub struct DiscordServerConfig {
    /// Hex-encoded Ed25519 application public key.
    pub public_key: Option<String>,
    /// Bot token used for REST calls.
    pub bot_token: Option<SecretString>,
    /// Application ID, used to address interaction follow-ups.
    pub application_id: Option<String>,
    /// REST API base URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for DiscordServerConfig {
    fn default() -> Self {
        Self {
            public_key: None,
            bot_token: None,
            application_id: None,
            api_base_url: default_api_base_url(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl DiscordServerConfig {
    /// Build the REST client configuration.
    pub fn client_config(&self) -> Result<DiscordConfig, ServerError> {
        let token = self
            .bot_token
            .as_ref()
            .ok_or_else(|| ServerError::Config("discord.bot_token is not set".into()))?;
        let application_id = self
            .application_id
            .as_deref()
            .ok_or_else(|| ServerError::Config("discord.application_id is not set".into()))?;

        Ok(
            DiscordConfig::new(token.expose_secret().as_str(), application_id)
                .with_api_base_url(self.api_base_url.as_str())
                .with_request_timeout(Duration::from_secs(self.request_timeout_seconds)),
        )
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_owned()
}

fn default_request_timeout() -> u64 {
    30
}
