//! Inbound interaction events and synchronous interaction responses.
//!
//! Raw interaction payloads are decoded once, at the HTTP boundary, into the
//! closed [`Interaction`] sum type. Everything downstream works on typed
//! values instead of probing JSON fields.

use serde::{Deserialize, Serialize};

use crate::types::DiscordUser;

/// Message flag making a reply visible only to the invoking user.
pub const EPHEMERAL: u64 = 1 << 6;

const PING: u8 = 1;
const APPLICATION_COMMAND: u8 = 2;

const RESPONSE_PONG: u8 = 1;
const RESPONSE_CHANNEL_MESSAGE: u8 = 4;

/// A decoded interaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawInteraction")]
pub enum Interaction {
    /// Endpoint health check sent by Discord.
    Ping,
    /// A slash command invocation.
    Command(CommandInteraction),
    /// Any other interaction type (components, autocomplete, modals, ...).
    Other {
        /// Raw interaction type.
        kind: u8,
    },
}

impl Interaction {
    /// Decode an interaction from a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

/// A slash command invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandInteraction {
    /// Interaction snowflake.
    pub id: String,
    /// Continuation token used to send follow-ups.
    pub token: String,
    /// Channel the command was invoked in.
    pub channel_id: Option<String>,
    /// Guild the command was invoked in, if any.
    pub guild_id: Option<String>,
    /// Command name.
    pub name: String,
    /// Supplied options.
    pub options: Vec<CommandOption>,
    /// Guild member who invoked the command (absent in DMs).
    pub member: Option<Member>,
    /// Invoking user.
    pub user: Option<DiscordUser>,
}

impl CommandInteraction {
    /// Look up an option value by name.
    pub fn option(&self, name: &str) -> Option<&CommandOptionValue> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_ref())
    }

    /// Integer value of the named option, if present and integral.
    pub fn integer_option(&self, name: &str) -> Option<i64> {
        match self.option(name)? {
            CommandOptionValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Role IDs held by the invoking member. Empty outside guilds.
    pub fn member_roles(&self) -> &[String] {
        self.member
            .as_ref()
            .map(|m| m.roles.as_slice())
            .unwrap_or_default()
    }

    /// Whether the invoking member holds `role_id`.
    pub fn has_role(&self, role_id: &str) -> bool {
        self.member_roles().iter().any(|r| r == role_id)
    }

    /// ID of the invoking user.
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}

/// A guild member attached to an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Member {
    /// Role IDs held by the member.
    #[serde(default)]
    pub roles: Vec<String>,
    /// The member's user object.
    #[serde(default)]
    pub user: Option<DiscordUser>,
}

/// A single option supplied with a slash command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandOption {
    /// Option name.
    pub name: String,
    /// Option value. Absent for sub-command groupings.
    #[serde(default)]
    pub value: Option<CommandOptionValue>,
}

/// Scalar value of a command option.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CommandOptionValue {
    Integer(i64),
    Number(f64),
    Boolean(bool),
    String(String),
}

#[derive(Deserialize)]
struct RawInteraction {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    id: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    channel_id: Option<String>,
    #[serde(default)]
    guild_id: Option<String>,
    #[serde(default)]
    data: Option<RawCommandData>,
    #[serde(default)]
    member: Option<Member>,
    #[serde(default)]
    user: Option<DiscordUser>,
}

#[derive(Deserialize)]
struct RawCommandData {
    name: String,
    #[serde(default)]
    options: Vec<CommandOption>,
}

impl From<RawInteraction> for Interaction {
    fn from(raw: RawInteraction) -> Self {
        match (raw.kind, raw.data) {
            (PING, _) => Self::Ping,
            (APPLICATION_COMMAND, Some(data)) => {
                let user = raw
                    .member
                    .as_ref()
                    .and_then(|m| m.user.clone())
                    .or(raw.user);
                Self::Command(CommandInteraction {
                    id: raw.id,
                    token: raw.token,
                    channel_id: raw.channel_id,
                    guild_id: raw.guild_id,
                    name: data.name,
                    options: data.options,
                    member: raw.member,
                    user,
                })
            }
            (kind, _) => Self::Other { kind },
        }
    }
}

/// Synchronous response to an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionResponse {
    /// Interaction callback type.
    #[serde(rename = "type")]
    pub kind: u8,
    /// Message data for channel-message responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<InteractionMessage>,
}

/// Message body of an interaction response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionMessage {
    /// Message text.
    pub content: String,
    /// Message flags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

impl InteractionResponse {
    /// Acknowledge a [`Interaction::Ping`].
    pub fn pong() -> Self {
        Self {
            kind: RESPONSE_PONG,
            data: None,
        }
    }

    /// Reply with a message visible to the whole channel.
    pub fn message(content: impl Into<String>) -> Self {
        Self {
            kind: RESPONSE_CHANNEL_MESSAGE,
            data: Some(InteractionMessage {
                content: content.into(),
                flags: None,
            }),
        }
    }

    /// Reply with a message visible only to the invoking user.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            kind: RESPONSE_CHANNEL_MESSAGE,
            data: Some(InteractionMessage {
                content: content.into(),
                flags: Some(EPHEMERAL),
            }),
        }
    }
}
