use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counters tracking archive job outcomes.
///
/// All counters use relaxed ordering. For a consistent point-in-time view,
/// call [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct ArchiveMetrics {
    /// Jobs accepted and handed to a background task.
    pub jobs_accepted: AtomicU64,
    /// Jobs whose artifact was uploaded and whose requester was notified.
    pub jobs_delivered: AtomicU64,
    /// Jobs that ended in the failed state, timeouts included.
    pub jobs_failed: AtomicU64,
    /// Jobs that exceeded their deadline.
    pub jobs_timed_out: AtomicU64,
    /// Message pages fetched from the upstream API.
    pub pages_fetched: AtomicU64,
    /// Messages included in delivered archives.
    pub messages_archived: AtomicU64,
    /// Attachments downloaded for delivered archives.
    pub attachments_downloaded: AtomicU64,
    /// Follow-up notifications that could not be sent.
    pub notifications_failed: AtomicU64,
}

impl ArchiveMetrics {
    pub fn increment_jobs_accepted(&self) {
        self.jobs_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_jobs_delivered(&self) {
        self.jobs_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_jobs_failed(&self) {
        self.jobs_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_jobs_timed_out(&self) {
        self.jobs_timed_out.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_pages_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_notifications_failed(&self) {
        self.notifications_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Add `count` to the archived message counter.
    pub fn add_messages_archived(&self, count: u64) {
        self.messages_archived.fetch_add(count, Ordering::Relaxed);
    }

    /// Add `count` to the downloaded attachment counter.
    pub fn add_attachments_downloaded(&self, count: u64) {
        self.attachments_downloaded
            .fetch_add(count, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            jobs_accepted: self.jobs_accepted.load(Ordering::Relaxed),
            jobs_delivered: self.jobs_delivered.load(Ordering::Relaxed),
            jobs_failed: self.jobs_failed.load(Ordering::Relaxed),
            jobs_timed_out: self.jobs_timed_out.load(Ordering::Relaxed),
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            messages_archived: self.messages_archived.load(Ordering::Relaxed),
            attachments_downloaded: self.attachments_downloaded.load(Ordering::Relaxed),
            notifications_failed: self.notifications_failed.load(Ordering::Relaxed),
        }
    }
}

/// A plain data snapshot of [`ArchiveMetrics`] at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub jobs_accepted: u64,
    pub jobs_delivered: u64,
    pub jobs_failed: u64,
    pub jobs_timed_out: u64,
    pub pages_fetched: u64,
    pub messages_archived: u64,
    pub attachments_downloaded: u64,
    pub notifications_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = ArchiveMetrics::default();
        assert_eq!(m.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn increment_and_snapshot() {
        let m = ArchiveMetrics::default();
        m.increment_jobs_accepted();
        m.increment_jobs_accepted();
        m.increment_jobs_delivered();
        m.increment_jobs_failed();
        m.increment_jobs_timed_out();
        m.increment_pages_fetched();
        m.increment_notifications_failed();
        m.add_messages_archived(42);
        m.add_attachments_downloaded(3);

        let snap = m.snapshot();
        assert_eq!(snap.jobs_accepted, 2);
        assert_eq!(snap.jobs_delivered, 1);
        assert_eq!(snap.jobs_failed, 1);
        assert_eq!(snap.jobs_timed_out, 1);
        assert_eq!(snap.pages_fetched, 1);
        assert_eq!(snap.notifications_failed, 1);
        assert_eq!(snap.messages_archived, 42);
        assert_eq!(snap.attachments_downloaded, 3);
    }

    #[test]
    fn snapshot_serializes_as_flat_object() {
        let m = ArchiveMetrics::default();
        m.increment_pages_fetched();
        let json = serde_json::to_value(m.snapshot()).unwrap();
        assert_eq!(json["pages_fetched"], 1);
        assert_eq!(json["jobs_accepted"], 0);
    }
}
