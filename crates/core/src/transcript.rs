//! Rendering of fetched messages into a readable transcript.
//!
//! The transcript is a small Markdown document: a heading naming the channel
//! followed by one line per message, oldest first. Author names and bodies
//! are escaped so that `&`, `<` and `>` survive any Markdown/HTML viewer
//! verbatim. Every attachment URL is rewritten to the file's path inside the
//! archive, wherever it appears in the document.

use std::fmt::{self, Write as _};

use chrono::{DateTime, Utc};

use crate::message::{AttachmentRef, Message};

/// Default `chrono` format for message timestamps (rendered in UTC).
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// A fully rendered transcript. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptDocument {
    text: String,
}

impl TranscriptDocument {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of message lines (excludes the heading and blank separator).
    pub fn message_lines(&self) -> usize {
        self.text.lines().skip(2).count()
    }
}

impl fmt::Display for TranscriptDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Escape the markup-significant characters `&`, `<` and `>`.
pub fn escape_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// Renders message sequences into [`TranscriptDocument`]s.
#[derive(Debug, Clone)]
pub struct TranscriptBuilder {
    timestamp_format: String,
}

impl Default for TranscriptBuilder {
    fn default() -> Self {
        Self {
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_owned(),
        }
    }
}

impl TranscriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the `chrono` strftime format used for timestamps.
    #[must_use]
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    /// Render `messages` for `channel_id`.
    ///
    /// `messages` may arrive in any order (the fetcher yields newest first);
    /// the output is always oldest first. Messages sharing a timestamp keep
    /// the reverse of their arrival order.
    pub fn build(&self, channel_id: &str, messages: &[Message]) -> TranscriptDocument {
        let mut ordered: Vec<&Message> = messages.iter().rev().collect();
        ordered.sort_by_key(|m| m.timestamp);

        let mut text = format!("# Channel Archive: {channel_id}\n\n");
        let lines: Vec<String> = ordered.iter().map(|m| self.render_line(m)).collect();
        text.push_str(&lines.join("\n"));

        // Longest URLs first so a URL that prefixes another cannot clobber it.
        let mut refs: Vec<&AttachmentRef> =
            ordered.iter().flat_map(|m| m.attachments.iter()).collect();
        refs.sort_by_key(|a| std::cmp::Reverse(a.url.len()));

        for attachment in refs {
            if attachment.url.is_empty() {
                continue;
            }
            let local = attachment.local_path();
            let escaped = escape_markup(&attachment.url);
            if escaped != attachment.url {
                text = text.replace(&escaped, &local);
            }
            text = text.replace(&attachment.url, &local);
        }

        TranscriptDocument { text }
    }

    fn render_line(&self, message: &Message) -> String {
        format!(
            "**{}** [{}]: {}",
            escape_markup(&message.author.to_string()),
            self.format_timestamp(&message.timestamp),
            escape_markup(&message.content),
        )
    }

    fn format_timestamp(&self, timestamp: &DateTime<Utc>) -> String {
        let mut out = String::new();
        if write!(out, "{}", timestamp.format(&self.timestamp_format)).is_err() {
            out.clear();
            out.push_str(&timestamp.to_rfc3339());
        }
        out
    }
}

/// Render `messages` with the default timestamp format.
pub fn build_transcript(channel_id: &str, messages: &[Message]) -> TranscriptDocument {
    TranscriptBuilder::default().build(channel_id, messages)
}
