//! The archive pipeline: paged fetching, attachment collection and the
//! background job orchestrator that ties them to packaging and delivery.

pub mod collector;
pub mod error;
pub mod fetcher;
pub mod metrics;
pub mod orchestrator;

#[cfg(test)]
mod testing;

pub use collector::collect_attachments;
pub use error::ArchiveError;
pub use fetcher::{fetch_messages, message_pages};
pub use metrics::{ArchiveMetrics, MetricsSnapshot};
pub use orchestrator::{
    ArchiveRunner, ArchiveSettings, DeliveryReceipt, JobOutcome, JobState,
};
