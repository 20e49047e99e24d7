use std::future::Future;

use archivist_core::Message;
use async_trait::async_trait;
use bytes::Bytes;

use crate::error::PlatformError;

/// Largest page the upstream message API will return for one request.
pub const MAX_PAGE_SIZE: usize = 100;

/// A file to post into a channel alongside a caption.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Name the file is posted under.
    pub file_name: String,
    /// MIME type of `data`.
    pub content_type: String,
    /// File content.
    pub data: Bytes,
    /// Message text accompanying the file.
    pub caption: String,
}

/// The upstream messaging platform, as seen by the archive pipeline.
///
/// This trait is **not** object-safe because it uses native `async fn`
/// methods. Use [`DynPlatform`] behind an `Arc` when dynamic dispatch is
/// needed; every `Platform` implements it through a blanket implementation.
pub trait Platform: Send + Sync {
    /// Short platform name used in diagnostics.
    fn name(&self) -> &str;

    /// Fetch one page of at most `limit` messages, newest first, strictly
    /// older than `before` when given.
    fn fetch_messages(
        &self,
        channel_id: &str,
        limit: usize,
        before: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Message>, PlatformError>> + Send;

    /// Resolve the display name of a channel.
    fn channel_name(
        &self,
        channel_id: &str,
    ) -> impl Future<Output = Result<String, PlatformError>> + Send;

    /// Download the full body at `url`.
    fn download(&self, url: &str) -> impl Future<Output = Result<Bytes, PlatformError>> + Send;

    /// Post `upload` into `channel_id`.
    fn upload(
        &self,
        channel_id: &str,
        upload: &Upload,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Send an ephemeral follow-up addressed by an interaction token.
    fn follow_up(
        &self,
        interaction_token: &str,
        content: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;
}

/// Object-safe platform trait for use behind `Arc<dyn DynPlatform>`.
///
/// Implement [`Platform`] and rely on the blanket implementation instead of
/// implementing this directly.
#[async_trait]
pub trait DynPlatform: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_messages(
        &self,
        channel_id: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<Message>, PlatformError>;

    async fn channel_name(&self, channel_id: &str) -> Result<String, PlatformError>;

    async fn download(&self, url: &str) -> Result<Bytes, PlatformError>;

    async fn upload(&self, channel_id: &str, upload: &Upload) -> Result<(), PlatformError>;

    async fn follow_up(&self, interaction_token: &str, content: &str)
    -> Result<(), PlatformError>;
}

#[async_trait]
impl<T: Platform + Sync> DynPlatform for T {
    fn name(&self) -> &str {
        Platform::name(self)
    }

    async fn fetch_messages(
        &self,
        channel_id: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<Message>, PlatformError> {
        Platform::fetch_messages(self, channel_id, limit, before).await
    }

    async fn channel_name(&self, channel_id: &str) -> Result<String, PlatformError> {
        Platform::channel_name(self, channel_id).await
    }

    async fn download(&self, url: &str) -> Result<Bytes, PlatformError> {
        Platform::download(self, url).await
    }

    async fn upload(&self, channel_id: &str, upload: &Upload) -> Result<(), PlatformError> {
        Platform::upload(self, channel_id, upload).await
    }

    async fn follow_up(
        &self,
        interaction_token: &str,
        content: &str,
    ) -> Result<(), PlatformError> {
        Platform::follow_up(self, interaction_token, content).await
    }
}
