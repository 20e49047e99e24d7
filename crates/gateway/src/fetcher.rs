//! Paged retrieval of a channel's message history.

use std::collections::HashSet;

use archivist_core::Message;
use archivist_provider::{DynPlatform, MAX_PAGE_SIZE};
use futures::{Stream, TryStreamExt, stream};
use tracing::debug;

use crate::error::ArchiveError;

/// Pagination state carried between page requests.
struct Cursor {
    before: Option<String>,
    fetched: usize,
    page: usize,
    seen: HashSet<String>,
    exhausted: bool,
}

impl Cursor {
    fn new() -> Self {
        Self {
            before: None,
            fetched: 0,
            page: 0,
            seen: HashSet::new(),
            exhausted: false,
        }
    }

    /// How many messages to ask for next, or `None` once the limit is met.
    fn next_request(&self, limit: Option<usize>) -> Option<usize> {
        match limit {
            Some(limit) if self.fetched >= limit => None,
            Some(limit) => Some(MAX_PAGE_SIZE.min(limit - self.fetched)),
            None => Some(MAX_PAGE_SIZE),
        }
    }
}

/// Stream a channel's messages page by page, newest first.
///
/// Each page is anchored before the oldest identifier seen so far. The
/// stream ends when `limit` messages have been yielded, when a page comes
/// back shorter than requested, or when a page contains nothing new. Any
/// upstream failure ends the stream with [`ArchiveError::UpstreamFetch`].
///
/// The stream is lazy: no request is issued until it is polled.
pub fn message_pages<'a>(
    platform: &'a dyn DynPlatform,
    channel_id: &'a str,
    limit: Option<usize>,
) -> impl Stream<Item = Result<Vec<Message>, ArchiveError>> + Send + 'a {
    stream::try_unfold(Cursor::new(), move |mut cursor| async move {
        if cursor.exhausted {
            return Ok(None);
        }
        let Some(request) = cursor.next_request(limit) else {
            return Ok(None);
        };

        let mut page = platform
            .fetch_messages(channel_id, request, cursor.before.as_deref())
            .await
            .map_err(ArchiveError::UpstreamFetch)?;
        let received = page.len();

        page.retain(|m| cursor.seen.insert(m.id.clone()));
        page.truncate(request);
        cursor.page += 1;

        debug!(
            channel_id,
            page = cursor.page,
            count = page.len(),
            before = cursor.before.as_deref().unwrap_or("-"),
            "fetched message page"
        );

        let Some(oldest) = page.last() else {
            return Ok(None);
        };
        cursor.before = Some(oldest.id.clone());
        cursor.fetched += page.len();
        cursor.exhausted = received < request;

        Ok::<_, ArchiveError>(Some((page, cursor)))
    })
}

/// Fetch up to `limit` messages of a channel, newest first.
///
/// No partial result is returned: the first failing page fails the call.
pub async fn fetch_messages(
    platform: &dyn DynPlatform,
    channel_id: &str,
    limit: Option<usize>,
) -> Result<Vec<Message>, ArchiveError> {
    message_pages(platform, channel_id, limit).try_concat().await
}

#[cfg(test)]
mod tests {
    use archivist_provider::PlatformError;
    use futures::StreamExt;

    use super::*;
    use crate::testing::{RecordingPlatform, history, message};

    fn ids(messages: &[Message]) -> Vec<u64> {
        messages.iter().map(|m| m.id.parse().unwrap()).collect()
    }

    #[tokio::test]
    async fn unbounded_fetch_returns_whole_history_newest_first() {
        let platform = RecordingPlatform::new(history(3));

        let messages = fetch_messages(&platform, "c", None).await.unwrap();

        assert_eq!(ids(&messages), vec![3, 2, 1]);
        let calls = platform.calls.lock().unwrap();
        assert_eq!(calls.fetches, vec![(100, None)]);
    }

    #[tokio::test]
    async fn limit_keeps_most_recent_messages() {
        let platform = RecordingPlatform::new(history(5));

        let messages = fetch_messages(&platform, "c", Some(2)).await.unwrap();

        assert_eq!(ids(&messages), vec![5, 4]);
        let calls = platform.calls.lock().unwrap();
        assert_eq!(calls.fetches, vec![(2, None)]);
    }

    #[tokio::test]
    async fn paginates_with_decreasing_cursors() {
        let platform = RecordingPlatform::new(history(250));

        let messages = fetch_messages(&platform, "c", None).await.unwrap();

        assert_eq!(messages.len(), 250);
        let calls = platform.calls.lock().unwrap();
        assert_eq!(
            calls.fetches,
            vec![
                (100, None),
                (100, Some("151".to_owned())),
                (100, Some("51".to_owned())),
            ]
        );
    }

    #[tokio::test]
    async fn full_final_page_needs_one_empty_page() {
        let platform = RecordingPlatform::new(history(200));

        let messages = fetch_messages(&platform, "c", None).await.unwrap();

        assert_eq!(messages.len(), 200);
        let calls = platform.calls.lock().unwrap();
        assert_eq!(calls.fetches.len(), 3);
        assert_eq!(calls.fetches[2], (100, Some("1".to_owned())));
    }

    #[tokio::test]
    async fn last_page_is_sized_to_remaining_limit() {
        let platform = RecordingPlatform::new(history(500));

        let messages = fetch_messages(&platform, "c", Some(130)).await.unwrap();

        assert_eq!(messages.len(), 130);
        let calls = platform.calls.lock().unwrap();
        assert_eq!(
            calls.fetches,
            vec![(100, None), (30, Some("401".to_owned()))]
        );
    }

    #[tokio::test]
    async fn count_never_exceeds_limit() {
        for total in [0, 1, 99, 100, 101, 250] {
            for limit in [1, 2, 50, 100, 101, 300] {
                let platform = RecordingPlatform::new(history(total));
                let messages = fetch_messages(&platform, "c", Some(limit)).await.unwrap();
                assert!(messages.len() <= limit);
                assert_eq!(messages.len(), limit.min(usize::try_from(total).unwrap()));
            }
        }
    }

    #[tokio::test]
    async fn cursors_strictly_decrease() {
        let platform = RecordingPlatform::new(history(1_000));

        fetch_messages(&platform, "c", None).await.unwrap();

        let calls = platform.calls.lock().unwrap();
        let cursors: Vec<u64> = calls
            .fetches
            .iter()
            .filter_map(|(_, before)| before.as_deref())
            .map(|b| b.parse().unwrap())
            .collect();
        assert!(!cursors.is_empty());
        assert!(cursors.windows(2).all(|w| w[0] > w[1]));
    }

    #[tokio::test]
    async fn empty_channel_issues_one_request() {
        let platform = RecordingPlatform::new(Vec::new());

        let messages = fetch_messages(&platform, "c", None).await.unwrap();

        assert!(messages.is_empty());
        assert_eq!(platform.calls.lock().unwrap().fetches.len(), 1);
    }

    #[tokio::test]
    async fn repeated_page_ends_pagination() {
        let page: Vec<Message> = (1..=100).rev().map(|id| message(id, "x")).collect();
        let platform = RecordingPlatform::new(Vec::new()).with_stuck_page(page);

        let messages = fetch_messages(&platform, "c", None).await.unwrap();

        assert_eq!(messages.len(), 100);
        assert_eq!(platform.calls.lock().unwrap().fetches.len(), 2);
    }

    #[tokio::test]
    async fn failure_on_later_page_discards_everything() {
        let platform = RecordingPlatform::new(history(150)).fail_fetch_on(2);

        let err = fetch_messages(&platform, "c", None).await.unwrap_err();

        assert!(matches!(
            err,
            ArchiveError::UpstreamFetch(PlatformError::Api { status: 500, .. })
        ));
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn stream_is_lazy() {
        let platform = RecordingPlatform::new(history(300));

        let mut pages = Box::pin(message_pages(&platform, "c", None));
        assert!(platform.calls.lock().unwrap().fetches.is_empty());

        let first = pages.next().await.unwrap().unwrap();
        assert_eq!(first.len(), 100);
        assert_eq!(platform.calls.lock().unwrap().fetches.len(), 1);
    }
}
