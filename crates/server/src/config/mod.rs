mod archive;
mod discord;
mod server;
mod telemetry;


pub use archive::*;
pub use discord::*;
pub use server::*;
pub use telemetry::*;

use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::ServerError;

/// Environment variable overriding `discord.public_key`.
pub const PUBLIC_KEY_ENV: &str = "ARCHIVIST_PUBLIC_KEY";
/// Environment variable overriding `discord.bot_token`.
pub const BOT_TOKEN_ENV: &str = "ARCHIVIST_BOT_TOKEN";
/// Environment variable overriding `discord.application_id`.
pub const APPLICATION_ID_ENV: &str = "ARCHIVIST_APPLICATION_ID";

/// Top-level configuration for the Archivist server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct ArchivistConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Discord credentials and REST client settings.
    #[serde(default)]
    pub discord: DiscordServerConfig,
    /// Archive job settings.
    #[serde(default)]
    pub archive: ArchiveConfig,
    /// OpenTelemetry distributed tracing configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl ArchivistConfig {
    /// Load configuration from `path`, or defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ServerError> {
        toml::from_str(contents).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Apply secret overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply secret overrides from `lookup`. Empty values are ignored.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(key) = lookup(PUBLIC_KEY_ENV) {
            self.discord.public_key = Some(key);
        }
        if let Some(token) = lookup(BOT_TOKEN_ENV) {
            self.discord.bot_token = Some(SecretString::new(token));
        }
        if let Some(id) = lookup(APPLICATION_ID_ENV) {
            self.discord.application_id = Some(id);
        }
    }

    /// Check that every value required to serve interactions is present.
    pub fn validate(&self) -> Result<(), ServerError> {
        let mut missing = Vec::new();
        if self.discord.public_key.is_none() {
            missing.push("discord.public_key");
        }
        if self.discord.bot_token.is_none() {
            missing.push("discord.bot_token");
        }
        if self.discord.application_id.is_none() {
            missing.push("discord.application_id");
        }
        if self.archive.destination_channel_id.is_none() {
            missing.push("archive.destination_channel_id");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ServerError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )))
        }
    }
}
