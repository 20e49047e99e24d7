use std::time::Duration;

use archivist_core::PackageError;
use archivist_provider::PlatformError;
use thiserror::Error;

/// Errors that can end an archive job.
///
/// Every variant except [`MetadataLookup`](Self::MetadataLookup) is fatal:
/// the job stops, nothing partial is delivered, and the requester receives
/// a single failure follow-up carrying this error's message.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The upstream message API failed while paginating.
    #[error("failed to fetch channel messages: {0}")]
    UpstreamFetch(#[source] PlatformError),

    /// A single attachment could not be downloaded.
    #[error("failed to download attachment {filename}: {source}")]
    AttachmentDownload {
        /// Filename of the attachment that failed.
        filename: String,
        #[source]
        source: PlatformError,
    },

    /// The channel display name could not be resolved.
    #[error("failed to resolve channel name: {0}")]
    MetadataLookup(#[source] PlatformError),

    /// The artifact could not be built.
    #[error("failed to package archive: {0}")]
    Packaging(#[from] PackageError),

    /// Uploading the artifact or sending a follow-up failed.
    #[error("failed to deliver archive: {0}")]
    Delivery(#[source] PlatformError),

    /// The running phase exceeded its deadline.
    #[error("archive did not complete within {}s", .0.as_secs())]
    Timeout(Duration),
}

impl ArchiveError {
    /// Whether this error aborts the job.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::MetadataLookup(_))
    }

    /// The upstream HTTP status behind this error, if there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamFetch(source)
            | Self::AttachmentDownload { source, .. }
            | Self::MetadataLookup(source)
            | Self::Delivery(source) => source.status(),
            Self::Packaging(_) | Self::Timeout(_) => None,
        }
    }
}
