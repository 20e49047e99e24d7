use std::fmt;

use uuid::Uuid;

/// One archive request: which channel, how many messages, and where to send
/// follow-up notifications.
///
/// Created when an `archive` command is accepted and owned exclusively by the
/// background task that runs it. Never persisted.
#[derive(Clone)]
pub struct ArchiveJob {
    /// Unique identifier used to correlate log events for this run.
    pub id: Uuid,
    /// Channel whose history is archived.
    pub channel_id: String,
    /// Maximum number of messages to include. `None` means the whole history.
    pub limit: Option<usize>,
    /// Correlation token addressing follow-ups to the original requester.
    pub interaction_token: String,
    /// User who issued the command, for diagnostics.
    pub requested_by: Option<String>,
}

impl fmt::Debug for ArchiveJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveJob")
            .field("id", &self.id)
            .field("channel_id", &self.channel_id)
            .field("limit", &self.limit)
            .field("interaction_token", &"[REDACTED]")
            .field("requested_by", &self.requested_by)
            .finish()
    }
}

impl ArchiveJob {
    pub fn new(channel_id: impl Into<String>, interaction_token: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            channel_id: channel_id.into(),
            limit: None,
            interaction_token: interaction_token.into(),
            requested_by: None,
        }
    }

    /// Apply a requested message limit. Zero or negative values mean "no limit".
    #[must_use]
    pub fn with_limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit
            .filter(|l| *l > 0)
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX));
        self
    }

    #[must_use]
    pub fn with_requested_by(mut self, user_id: impl Into<String>) -> Self {
        self.requested_by = Some(user_id.into());
        self
    }

    /// File name the packaged archive is delivered under.
    pub fn artifact_file_name(&self) -> String {
        format!("archive_{}.zip", self.channel_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_limit_is_kept() {
        let job = ArchiveJob::new("c", "tok").with_limit(Some(25));
        assert_eq!(job.limit, Some(25));
    }

    #[test]
    fn non_positive_limit_means_unbounded() {
        assert_eq!(ArchiveJob::new("c", "tok").with_limit(Some(0)).limit, None);
        assert_eq!(ArchiveJob::new("c", "tok").with_limit(Some(-3)).limit, None);
        assert_eq!(ArchiveJob::new("c", "tok").with_limit(None).limit, None);
    }

    #[test]
    fn artifact_file_name_uses_channel_id() {
        let job = ArchiveJob::new("123456", "tok");
        assert_eq!(job.artifact_file_name(), "archive_123456.zip");
    }

    #[test]
    fn debug_redacts_interaction_token() {
        let job = ArchiveJob::new("c", "secret-token-value");
        let debug = format!("{job:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-token-value"));
    }

    #[test]
    fn job_ids_are_unique() {
        assert_ne!(ArchiveJob::new("c", "t").id, ArchiveJob::new("c", "t").id);
    }
}
