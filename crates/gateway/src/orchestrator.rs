//! Background execution of archive jobs.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use archivist_core::{ArchiveArtifact, ArchiveJob, Message, TranscriptBuilder, package};
use archivist_provider::{DynPlatform, Upload};
use futures::TryStreamExt;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::collector::collect_attachments;
use crate::error::ArchiveError;
use crate::fetcher::message_pages;
use crate::metrics::ArchiveMetrics;

/// Lifecycle of an archive job. `Delivered` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Accepted,
    Running,
    Delivered,
    Failed,
}

impl JobState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Running => "running",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a delivered job produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Display name used in the caption and follow-up.
    pub channel_name: String,
    pub file_name: String,
    pub messages: usize,
    pub attachments: usize,
    /// Size of the uploaded artifact.
    pub bytes: usize,
}

/// Terminal result of one job.
#[derive(Debug)]
pub enum JobOutcome {
    Delivered(DeliveryReceipt),
    Failed(ArchiveError),
}

impl JobOutcome {
    pub fn state(&self) -> JobState {
        match self {
            Self::Delivered(_) => JobState::Delivered,
            Self::Failed(_) => JobState::Failed,
        }
    }
}

/// Settings shared by every job a runner executes.
#[derive(Debug, Clone)]
pub struct ArchiveSettings {
    /// Channel the artifact is uploaded to.
    pub destination_channel_id: String,
    /// Upper bound on the running phase.
    pub deadline: Duration,
    /// Maximum attachment downloads in flight per job.
    pub attachment_concurrency: usize,
    pub transcript: TranscriptBuilder,
}

impl ArchiveSettings {
    pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(900);

    pub fn new(destination_channel_id: impl Into<String>) -> Self {
        Self {
            destination_channel_id: destination_channel_id.into(),
            deadline: Self::DEFAULT_DEADLINE,
            attachment_concurrency: 1,
            transcript: TranscriptBuilder::new(),
        }
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    #[must_use]
    pub fn with_attachment_concurrency(mut self, concurrency: usize) -> Self {
        self.attachment_concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.transcript = self.transcript.with_timestamp_format(format);
        self
    }
}

/// Runs archive jobs against a platform.
///
/// Cloning is cheap; clones share the platform client, settings and
/// metrics. Each job runs as its own task and shares no mutable state with
/// any other job.
#[derive(Clone)]
pub struct ArchiveRunner {
    platform: Arc<dyn DynPlatform>,
    settings: Arc<ArchiveSettings>,
    metrics: Arc<ArchiveMetrics>,
    active: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl ArchiveRunner {
    pub fn new(platform: Arc<dyn DynPlatform>, settings: ArchiveSettings) -> Self {
        Self {
            platform,
            settings: Arc::new(settings),
            metrics: Arc::new(ArchiveMetrics::default()),
            active: Arc::new(AtomicUsize::new(0)),
            idle: Arc::new(Notify::new()),
        }
    }

    /// Share an existing metrics registry instead of a private one.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<ArchiveMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn settings(&self) -> &ArchiveSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &Arc<ArchiveMetrics> {
        &self.metrics
    }

    /// Text of the immediate acknowledgment for an accepted job.
    pub fn acknowledgment(&self) -> String {
        format!(
            "✅ Archive is being uploaded to <#{}>",
            self.settings.destination_channel_id
        )
    }

    /// Accept `job` and run it on a background task.
    ///
    /// Returns without waiting for any pipeline work; the caller is free to
    /// answer the interaction immediately.
    pub fn spawn(&self, job: ArchiveJob) -> JoinHandle<JobOutcome> {
        self.metrics.increment_jobs_accepted();
        info!(
            job_id = %job.id,
            channel_id = %job.channel_id,
            limit = ?job.limit,
            requested_by = job.requested_by.as_deref().unwrap_or("-"),
            state = %JobState::Accepted,
            "archive job accepted"
        );

        let guard = InFlight::enter(&self.active, &self.idle);
        let runner = self.clone();
        tokio::spawn(async move {
            let _guard = guard;
            runner.run(job).await
        })
    }

    /// Number of spawned jobs that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait until every spawned job has finished.
    pub async fn drain(&self) {
        loop {
            let idle = self.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            idle.await;
        }
    }

    /// Run `job` to completion, sending exactly one terminal follow-up.
    #[instrument(skip_all, fields(job_id = %job.id, channel_id = %job.channel_id))]
    pub async fn run(&self, job: ArchiveJob) -> JobOutcome {
        info!(
            job_id = %job.id,
            channel_id = %job.channel_id,
            state = %JobState::Running,
            "archive job running"
        );

        let result = tokio::time::timeout(self.settings.deadline, self.execute(&job))
            .await
            .unwrap_or(Err(ArchiveError::Timeout(self.settings.deadline)));

        let receipt = match result {
            Ok(receipt) => receipt,
            Err(err) => return self.fail(&job, err).await,
        };

        let notice = format!(
            "📦 Archive for **#{}** is now available in <#{}>.",
            receipt.channel_name, self.settings.destination_channel_id
        );
        if let Err(source) = self
            .platform
            .follow_up(&job.interaction_token, &notice)
            .await
        {
            self.metrics.increment_notifications_failed();
            return self.fail(&job, ArchiveError::Delivery(source)).await;
        }

        self.metrics.increment_jobs_delivered();
        self.metrics.add_messages_archived(receipt.messages as u64);
        self.metrics.add_attachments_downloaded(receipt.attachments as u64);
        info!(
            job_id = %job.id,
            channel_id = %job.channel_id,
            state = %JobState::Delivered,
            messages = receipt.messages,
            attachments = receipt.attachments,
            bytes = receipt.bytes,
            "archive job delivered"
        );
        JobOutcome::Delivered(receipt)
    }

    async fn execute(&self, job: &ArchiveJob) -> Result<DeliveryReceipt, ArchiveError> {
        let platform = self.platform.as_ref();

        let messages: Vec<Message> = message_pages(platform, &job.channel_id, job.limit)
            .inspect_ok(|_| self.metrics.increment_pages_fetched())
            .try_concat()
            .await?;

        let transcript = self
            .settings
            .transcript
            .build(&job.channel_id, &messages);
        debug!(job_id = %job.id, lines = transcript.message_lines(), "transcript rendered");
        // Oldest first, so a later message's attachment replaces an earlier
        // one with the same filename.
        let attachments = collect_attachments(
            platform,
            messages.iter().rev(),
            self.settings.attachment_concurrency,
        )
        .await?;
        let downloaded: usize = messages.iter().map(|m| m.attachments.len()).sum();

        let artifact = package(&transcript, &attachments)?;

        let channel_name = match platform.channel_name(&job.channel_id).await {
            Ok(name) => name,
            Err(source) => {
                let err = ArchiveError::MetadataLookup(source);
                warn!(job_id = %job.id, error = %err, "using channel id as display name");
                job.channel_id.clone()
            }
        };

        let upload = Upload {
            file_name: job.artifact_file_name(),
            content_type: ArchiveArtifact::CONTENT_TYPE.to_owned(),
            caption: format!(
                "Archive of **#{channel_name}** (ID: {})",
                job.channel_id
            ),
            data: artifact.into_bytes(),
        };
        platform
            .upload(&self.settings.destination_channel_id, &upload)
            .await
            .map_err(ArchiveError::Delivery)?;

        Ok(DeliveryReceipt {
            channel_name,
            file_name: upload.file_name,
            messages: messages.len(),
            attachments: downloaded,
            bytes: upload.data.len(),
        })
    }

    async fn fail(&self, job: &ArchiveJob, err: ArchiveError) -> JobOutcome {
        if matches!(err, ArchiveError::Timeout(_)) {
            self.metrics.increment_jobs_timed_out();
        }
        self.metrics.increment_jobs_failed();
        error!(
            job_id = %job.id,
            channel_id = %job.channel_id,
            state = %JobState::Failed,
            error = %err,
            "archive job failed"
        );

        let notice = format!("⚠️ Error archiving channel: {err}");
        if let Err(notify_err) = self
            .platform
            .follow_up(&job.interaction_token, &notice)
            .await
        {
            self.metrics.increment_notifications_failed();
            warn!(
                job_id = %job.id,
                error = %notify_err,
                "failed to send failure follow-up"
            );
        }

        JobOutcome::Failed(err)
    }
}

/// Counts one spawned job as in flight until dropped, including when the job
/// panics.
struct InFlight {
    active: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl InFlight {
    fn enter(active: &Arc<AtomicUsize>, idle: &Arc<Notify>) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self {
            active: Arc::clone(active),
            idle: Arc::clone(idle),
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}
