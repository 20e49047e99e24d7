//! Discord integration for Archivist.
//!
//! Provides [`DiscordClient`], an implementation of
//! [`Platform`](archivist_provider::Platform) over the
//! [Discord REST API](https://discord.com/developers/docs/reference), and the
//! strongly typed inbound [`Interaction`] model.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use archivist_discord::{DiscordClient, DiscordConfig};
//!
//! let config = DiscordConfig::new("bot-token", "123456789012345678");
//! let client = DiscordClient::new(config).expect("client builds");
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod interaction;
pub mod types;

pub use client::DiscordClient;
pub use config::DiscordConfig;
pub use error::DiscordError;
pub use interaction::{
    CommandInteraction, CommandOption, CommandOptionValue, EPHEMERAL, Interaction,
    InteractionResponse, Member,
};
pub use types::{DiscordAttachment, DiscordChannel, DiscordMessage, DiscordUser};
