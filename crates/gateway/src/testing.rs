//! In-memory platform used by the pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use archivist_core::{AttachmentRef, Author, Message};
use archivist_provider::{Platform, PlatformError, Upload};
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};

/// A message with numeric id `id`, posted `id` seconds after a fixed epoch.
pub fn message(id: u64, content: &str) -> Message {
    Message::new(
        id.to_string(),
        Author::new(format!("user{id}")),
        content,
        at(id),
    )
}

pub fn at(offset_secs: u64) -> DateTime<Utc> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    base + chrono::Duration::seconds(i64::try_from(offset_secs).unwrap())
}

/// Channel history with ids `1..=count`, oldest first.
pub fn history(count: u64) -> Vec<Message> {
    (1..=count).map(|id| message(id, &format!("message {id}"))).collect()
}

pub fn attachment(filename: &str) -> AttachmentRef {
    AttachmentRef::new(format!("https://cdn.example.com/{filename}"), filename)
}

#[derive(Debug, Default)]
pub struct Calls {
    /// `(limit, before)` per page request.
    pub fetches: Vec<(usize, Option<String>)>,
    pub downloads: Vec<String>,
    pub uploads: Vec<(String, Upload)>,
    pub follow_ups: Vec<(String, String)>,
}

/// Emulates the upstream API over a fixed history and records every call.
#[derive(Default)]
pub struct RecordingPlatform {
    /// Oldest first; served newest first like the real API.
    history: Vec<Message>,
    files: HashMap<String, Bytes>,
    channel_name: Option<String>,
    fail_fetch_on: Option<usize>,
    upload_status: Option<u16>,
    failing_follow_ups: usize,
    fetch_delay: Option<Duration>,
    /// When set, every page returns these messages regardless of cursor.
    stuck_page: Option<Vec<Message>>,
    panic_on_fetch: bool,
    pub calls: Mutex<Calls>,
}

impl RecordingPlatform {
    pub fn new(history: Vec<Message>) -> Self {
        Self {
            history,
            channel_name: Some("general".into()),
            ..Self::default()
        }
    }

    pub fn with_file(mut self, filename: &str, data: &'static [u8]) -> Self {
        self.files.insert(
            format!("https://cdn.example.com/{filename}"),
            Bytes::from_static(data),
        );
        self
    }

    pub fn without_channel_name(mut self) -> Self {
        self.channel_name = None;
        self
    }

    /// Fail the `n`th page request (1-based) with HTTP 500.
    pub fn fail_fetch_on(mut self, n: usize) -> Self {
        self.fail_fetch_on = Some(n);
        self
    }

    pub fn fail_upload_with(mut self, status: u16) -> Self {
        self.upload_status = Some(status);
        self
    }

    /// Fail the first `n` follow-ups.
    pub fn fail_follow_ups(mut self, n: usize) -> Self {
        self.failing_follow_ups = n;
        self
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    pub fn with_stuck_page(mut self, page: Vec<Message>) -> Self {
        self.stuck_page = Some(page);
        self
    }

    pub fn panic_on_fetch(mut self) -> Self {
        self.panic_on_fetch = true;
        self
    }

    pub fn follow_ups(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .follow_ups
            .iter()
            .map(|(_, content)| content.clone())
            .collect()
    }

    pub fn upload_count(&self) -> usize {
        self.calls.lock().unwrap().uploads.len()
    }
}

impl Platform for RecordingPlatform {
    fn name(&self) -> &str {
        "recording"
    }

    async fn fetch_messages(
        &self,
        _channel_id: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<Message>, PlatformError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.fetches.push((limit, before.map(str::to_owned)));
            calls.fetches.len()
        };
        assert!(!self.panic_on_fetch, "fetch_messages panicked");
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_fetch_on == Some(call) {
            return Err(PlatformError::Api {
                status: 500,
                body: "Internal Server Error".into(),
            });
        }
        if let Some(page) = &self.stuck_page {
            return Ok(page.clone());
        }

        let cursor = before.map(|b| b.parse::<u64>().unwrap());
        Ok(self
            .history
            .iter()
            .rev()
            .filter(|m| cursor.is_none_or(|c| m.id.parse::<u64>().unwrap() < c))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn channel_name(&self, channel_id: &str) -> Result<String, PlatformError> {
        self.channel_name.clone().ok_or(PlatformError::Api {
            status: 404,
            body: format!("unknown channel {channel_id}"),
        })
    }

    async fn download(&self, url: &str) -> Result<Bytes, PlatformError> {
        self.calls.lock().unwrap().downloads.push(url.to_owned());
        self.files.get(url).cloned().ok_or(PlatformError::Api {
            status: 404,
            body: String::new(),
        })
    }

    async fn upload(&self, channel_id: &str, upload: &Upload) -> Result<(), PlatformError> {
        if let Some(status) = self.upload_status {
            return Err(PlatformError::Api {
                status,
                body: "Missing Permissions".into(),
            });
        }
        self.calls
            .lock()
            .unwrap()
            .uploads
            .push((channel_id.to_owned(), upload.clone()));
        Ok(())
    }

    async fn follow_up(&self, interaction_token: &str, content: &str) -> Result<(), PlatformError> {
        let mut calls = self.calls.lock().unwrap();
        calls
            .follow_ups
            .push((interaction_token.to_owned(), content.to_owned()));
        if calls.follow_ups.len() <= self.failing_follow_ups {
            return Err(PlatformError::Api {
                status: 404,
                body: "Unknown Webhook".into(),
            });
        }
        Ok(())
    }
}
