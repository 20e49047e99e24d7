use archivist_core::{AttachmentRef, Author, Message};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Discord user object (subset).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiscordUser {
    /// User snowflake.
    pub id: String,
    /// Account username.
    pub username: String,
    /// Legacy discriminator; `"0"` for migrated accounts.
    #[serde(default)]
    pub discriminator: Option<String>,
}

/// A Discord attachment object (subset).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiscordAttachment {
    /// Name of the attached file.
    pub filename: String,
    /// Source URL of the file.
    pub url: String,
}

/// A Discord message object as returned by `GET /channels/{id}/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiscordMessage {
    /// Message snowflake.
    pub id: String,
    /// Author of the message.
    pub author: DiscordUser,
    /// Text content. Empty when the message only carries attachments or
    /// embeds.
    #[serde(default)]
    pub content: String,
    /// ISO 8601 timestamp the message was sent at.
    pub timestamp: DateTime<Utc>,
    /// Attached files.
    #[serde(default)]
    pub attachments: Vec<DiscordAttachment>,
}

impl From<DiscordMessage> for Message {
    fn from(msg: DiscordMessage) -> Self {
        let mut author = Author::new(msg.author.username);
        if let Some(d) = msg.author.discriminator {
            author = author.with_discriminator(d);
        }
        Self {
            id: msg.id,
            author,
            content: msg.content,
            timestamp: msg.timestamp,
            attachments: msg
                .attachments
                .into_iter()
                .map(|a| AttachmentRef::new(a.url, a.filename))
                .collect(),
        }
    }
}

/// A Discord channel object (subset) from `GET /channels/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiscordChannel {
    /// Channel snowflake.
    pub id: String,
    /// Channel name. Absent for DM channels.
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of `POST /webhooks/{application_id}/{token}`.
#[derive(Debug, Clone, Serialize)]
pub struct FollowUpMessage {
    /// Message text.
    pub content: String,
    /// Message flags (e.g. [`EPHEMERAL`](crate::interaction::EPHEMERAL)).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

/// `payload_json` part of a multipart `POST /channels/{id}/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessagePayload {
    /// Message text.
    pub content: String,
    /// Descriptors for the uploaded `files[n]` parts.
    pub attachments: Vec<AttachmentDescriptor>,
}

/// Describes one uploaded file part.
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentDescriptor {
    /// Index matching the `files[n]` part name.
    pub id: u32,
    /// Name shown for the file.
    pub filename: String,
}
