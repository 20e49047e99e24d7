//! Attachment retrieval.

use archivist_core::{AttachmentBlob, AttachmentRef, AttachmentSet, Message};
use archivist_provider::DynPlatform;
use futures::{StreamExt, TryStreamExt, stream};
use tracing::debug;

use crate::error::ArchiveError;

/// Download every attachment referenced by `messages`.
///
/// References are processed in the order the messages are given. Up to
/// `concurrency` downloads are in flight at once, but results are inserted
/// in that same order, so when two attachments share a filename the later
/// one wins regardless of which download finished first. The first failed
/// download fails the whole collection.
pub async fn collect_attachments<'a, I>(
    platform: &dyn DynPlatform,
    messages: I,
    concurrency: usize,
) -> Result<AttachmentSet, ArchiveError>
where
    I: IntoIterator<Item = &'a Message>,
{
    // Owned refs: a closure over borrowed refs is not general enough to be
    // spawned.
    let refs: Vec<AttachmentRef> = messages
        .into_iter()
        .flat_map(|m| m.attachments.iter().cloned())
        .collect();

    let mut downloads = stream::iter(refs)
        .map(|attachment| async move {
            platform
                .download(&attachment.url)
                .await
                .map(|data| AttachmentBlob::new(attachment.filename.clone(), data))
                .map_err(|source| ArchiveError::AttachmentDownload {
                    filename: attachment.filename,
                    source,
                })
        })
        .buffered(concurrency.max(1));

    let mut set = AttachmentSet::new();
    while let Some(blob) = downloads.try_next().await? {
        debug!(filename = %blob.filename, bytes = blob.data.len(), "attachment collected");
        set.insert(blob);
    }
    debug!(files = set.len(), bytes = set.total_bytes(), "attachments collected");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use archivist_provider::PlatformError;

    use super::*;
    use crate::testing::{RecordingPlatform, attachment, message};

    #[tokio::test]
    async fn no_attachments_no_requests() {
        let platform = RecordingPlatform::new(Vec::new());
        let messages = vec![message(1, "a"), message(2, "b")];

        let set = collect_attachments(&platform, &messages, 1).await.unwrap();

        assert!(set.is_empty());
        assert!(platform.calls.lock().unwrap().downloads.is_empty());
    }

    #[tokio::test]
    async fn downloads_in_message_order() {
        let platform = RecordingPlatform::new(Vec::new())
            .with_file("a.txt", b"A")
            .with_file("b.txt", b"B")
            .with_file("c.txt", b"C");
        let messages = vec![
            message(1, "").with_attachment(attachment("a.txt")),
            message(2, "")
                .with_attachment(attachment("b.txt"))
                .with_attachment(attachment("c.txt")),
        ];

        let set = collect_attachments(&platform, &messages, 1).await.unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.get("b.txt").unwrap().as_ref(), b"B");
        let calls = platform.calls.lock().unwrap();
        assert_eq!(
            calls.downloads,
            vec![
                "https://cdn.example.com/a.txt",
                "https://cdn.example.com/b.txt",
                "https://cdn.example.com/c.txt",
            ]
        );
    }

    #[tokio::test]
    async fn colliding_filenames_keep_the_last() {
        let platform = RecordingPlatform::new(Vec::new())
            .with_file("first/cat.png", b"old")
            .with_file("second/cat.png", b"new");
        let older = AttachmentRef::new("https://cdn.example.com/first/cat.png", "cat.png");
        let newer = AttachmentRef::new("https://cdn.example.com/second/cat.png", "cat.png");
        let messages = vec![
            message(1, "").with_attachment(older),
            message(2, "").with_attachment(newer),
        ];

        for concurrency in [1, 4] {
            let set = collect_attachments(&platform, &messages, concurrency)
                .await
                .unwrap();
            assert_eq!(set.len(), 1);
            assert_eq!(set.get("cat.png").unwrap().as_ref(), b"new");
        }
    }

    #[tokio::test]
    async fn concurrency_does_not_change_the_result() {
        let mut platform = RecordingPlatform::new(Vec::new());
        let mut messages = Vec::new();
        for (id, name) in ["a.bin", "b.bin", "c.bin", "d.bin"].iter().enumerate() {
            platform = platform.with_file(name, b"data");
            messages.push(message(u64::try_from(id).unwrap(), "").with_attachment(attachment(name)));
        }

        let sequential = collect_attachments(&platform, &messages, 1).await.unwrap();
        let parallel = collect_attachments(&platform, &messages, 3).await.unwrap();

        assert_eq!(sequential, parallel);
    }

    #[tokio::test]
    async fn failed_download_is_fatal() {
        let platform = RecordingPlatform::new(Vec::new()).with_file("ok.png", b"ok");
        let messages = vec![
            message(1, "")
                .with_attachment(attachment("ok.png"))
                .with_attachment(attachment("missing.png")),
        ];

        let err = collect_attachments(&platform, &messages, 1)
            .await
            .unwrap_err();

        match err {
            ArchiveError::AttachmentDownload { filename, source } => {
                assert_eq!(filename, "missing.png");
                assert!(matches!(source, PlatformError::Api { status: 404, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
