use archivist_core::Message;
use archivist_provider::{Platform, PlatformError, Upload};
use bytes::Bytes;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use secrecy::ExposeSecret;
use tracing::{debug, info, instrument, warn};

use crate::config::DiscordConfig;
use crate::error::DiscordError;
use crate::interaction::EPHEMERAL;
use crate::types::{
    AttachmentDescriptor, CreateMessagePayload, DiscordChannel, DiscordMessage, FollowUpMessage,
};

/// Discord REST client used by the archive pipeline.
///
/// Implements [`Platform`] so the gateway can run against it or against any
/// other implementation (in tests, an in-memory mock).
pub struct DiscordClient {
    config: DiscordConfig,
    client: Client,
}

impl DiscordClient {
    /// Create a new client with the given configuration.
    pub fn new(config: DiscordConfig) -> Result<Self, DiscordError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base_url)
    }

    fn bot_authorization(&self) -> String {
        format!("Bot {}", self.config.bot_token.expose_secret())
    }

    /// Map rate limits and non-success statuses to errors, passing
    /// successful responses through.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, DiscordError> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Discord API rate limit hit");
            return Err(DiscordError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiscordError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn get_messages(
        &self,
        channel_id: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<DiscordMessage>, DiscordError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(before) = before {
            query.push(("before", before.to_owned()));
        }

        let response = self
            .client
            .get(self.url(&format!("/channels/{channel_id}/messages")))
            .header(AUTHORIZATION, self.bot_authorization())
            .query(&query)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn get_channel(&self, channel_id: &str) -> Result<DiscordChannel, DiscordError> {
        let response = self
            .client
            .get(self.url(&format!("/channels/{channel_id}")))
            .header(AUTHORIZATION, self.bot_authorization())
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn get_bytes(&self, url: &str) -> Result<Bytes, DiscordError> {
        let response = self.client.get(url).send().await?;
        Ok(Self::check(response).await?.bytes().await?)
    }

    async fn post_file(&self, channel_id: &str, upload: &Upload) -> Result<(), DiscordError> {
        let payload = CreateMessagePayload {
            content: upload.caption.clone(),
            attachments: vec![AttachmentDescriptor {
                id: 0,
                filename: upload.file_name.clone(),
            }],
        };
        let payload_json = serde_json::to_string(&payload).map_err(|e| {
            DiscordError::InvalidPayload(format!("failed to serialize request: {e}"))
        })?;

        let part = reqwest::multipart::Part::bytes(upload.data.to_vec())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)?;
        let form = reqwest::multipart::Form::new()
            .text("payload_json", payload_json)
            .part("files[0]", part);

        let response = self
            .client
            .post(self.url(&format!("/channels/{channel_id}/messages")))
            .header(AUTHORIZATION, self.bot_authorization())
            .multipart(form)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn post_follow_up(&self, token: &str, content: &str) -> Result<(), DiscordError> {
        let body = FollowUpMessage {
            content: content.to_owned(),
            flags: Some(EPHEMERAL),
        };

        let response = self
            .client
            .post(self.url(&format!(
                "/webhooks/{}/{token}",
                self.config.application_id
            )))
            .json(&body)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

impl Platform for DiscordClient {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "discord"
    }

    #[instrument(skip(self), fields(platform = "discord"))]
    async fn fetch_messages(
        &self,
        channel_id: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<Message>, PlatformError> {
        debug!("fetching message page");
        let page = self.get_messages(channel_id, limit, before).await?;
        Ok(page.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self), fields(platform = "discord"))]
    async fn channel_name(&self, channel_id: &str) -> Result<String, PlatformError> {
        let channel = self.get_channel(channel_id).await?;
        Ok(channel.name.unwrap_or(channel.id))
    }

    #[instrument(skip(self), fields(platform = "discord"))]
    async fn download(&self, url: &str) -> Result<Bytes, PlatformError> {
        let data = self.get_bytes(url).await?;
        debug!(bytes = data.len(), "attachment downloaded");
        Ok(data)
    }

    #[instrument(skip(self, upload), fields(platform = "discord", file_name = %upload.file_name))]
    async fn upload(&self, channel_id: &str, upload: &Upload) -> Result<(), PlatformError> {
        self.post_file(channel_id, upload).await?;
        info!(bytes = upload.data.len(), "file uploaded to Discord");
        Ok(())
    }

    #[instrument(skip(self, interaction_token, content), fields(platform = "discord"))]
    async fn follow_up(
        &self,
        interaction_token: &str,
        content: &str,
    ) -> Result<(), PlatformError> {
        self.post_follow_up(interaction_token, content).await?;
        debug!("follow-up sent");
        Ok(())
    }
}
