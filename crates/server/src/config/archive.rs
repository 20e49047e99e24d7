use std::time::Duration;

use archivist_core::DEFAULT_TIMESTAMP_FORMAT;
use archivist_gateway::ArchiveSettings;
use serde::Deserialize;

use crate::error::ServerError;

/// Archive command and job settings.
///
/// # Example
///
/// ```toml
/// [archive]
/// destination_channel_id = "222222222222222222"
/// required_role_id = "333333333333333333"
/// required_role_name = "can-archive"
/// deadline_seconds = 900
/// attachment_concurrency = 4
/// ```
#[derive(Debug, Deserialize)]
pub struct ArchiveConfig {
    /// Channel archives are uploaded to.
    pub destination_channel_id: Option<String>,
    /// Role a member must hold to run `/archive`. When unset nobody may.
    pub required_role_id: Option<String>,
    /// Human-readable role name shown in rejections.
    #[serde(default = "default_role_name")]
    pub required_role_name: String,
    /// Upper bound on one job's running phase, in seconds.
    #[serde(default = "default_deadline")]
    pub deadline_seconds: u64,
    /// Attachment downloads in flight per job.
    #[serde(default = "default_concurrency")]
    pub attachment_concurrency: usize,
    /// `chrono` strftime format for transcript timestamps (UTC).
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            destination_channel_id: None,
            required_role_id: None,
            required_role_name: default_role_name(),
            deadline_seconds: default_deadline(),
            attachment_concurrency: default_concurrency(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

impl ArchiveConfig {
    /// Build the runner settings.
    pub fn settings(&self) -> Result<ArchiveSettings, ServerError> {
        let destination = self.destination_channel_id.as_deref().ok_or_else(|| {
            ServerError::Config("archive.destination_channel_id is not set".into())
        })?;

        Ok(ArchiveSettings::new(destination)
            .with_deadline(Duration::from_secs(self.deadline_seconds))
            .with_attachment_concurrency(self.attachment_concurrency)
            .with_timestamp_format(self.timestamp_format.as_str()))
    }
}

fn default_role_name() -> String {
    "can-archive".to_owned()
}

fn default_deadline() -> u64 {
    900
}

fn default_concurrency() -> usize {
    1
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_owned()
}
