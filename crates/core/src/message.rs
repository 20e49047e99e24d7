use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::package::ATTACHMENTS_DIR;

/// Identity of the user who authored a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Account username.
    pub username: String,
    /// Legacy four-digit discriminator. Accounts migrated to unique
    /// usernames report `"0"`, which is treated as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
}

impl Author {
    /// Create an author with no discriminator.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            discriminator: None,
        }
    }

    /// Attach a discriminator.
    #[must_use]
    pub fn with_discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = Some(discriminator.into());
        self
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.discriminator.as_deref() {
            Some(d) if !d.is_empty() && d != "0" => write!(f, "{}#{d}", self.username),
            _ => f.write_str(&self.username),
        }
    }
}

/// A file attached to a message, as reported by the upstream platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// Remote URL the file can be downloaded from.
    pub url: String,
    /// Filename as provided by the upstream attachment metadata.
    pub filename: String,
}

impl AttachmentRef {
    pub fn new(url: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            filename: filename.into(),
        }
    }

    /// Path of this attachment inside the archive, e.g. `attachments/cat.png`.
    pub fn local_path(&self) -> String {
        format!("{ATTACHMENTS_DIR}/{}", self.filename)
    }
}

/// A single channel message fetched from the upstream platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Upstream message identifier.
    pub id: String,
    /// Who wrote it.
    pub author: Author,
    /// Text body. Empty for attachment-only messages.
    #[serde(default)]
    pub content: String,
    /// When the message was posted.
    pub timestamp: DateTime<Utc>,
    /// Files attached to the message.
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        author: Author,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            author,
            content: content.into(),
            timestamp,
            attachments: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attachment(mut self, attachment: AttachmentRef) -> Self {
        self.attachments.push(attachment);
        self
    }
}
