//! Replay of reviews written while the API was unreachable.
//!
//! A sweep walks the review collection in key order. Pending reviews carry
//! negative ids, so they all come before the first server-assigned id and the
//! walk stops there. Each pending review is posted again, then its staging
//! row is swapped for the server copy.
//!
//! Replay is at-least-once: when the post succeeds but the local swap fails,
//! the next sweep posts the review again. Every post carries an idempotency
//! key derived from the pending id so an API that honours the header can
//! drop the repeat.

use crate::db::LocalStore;
use crate::error::Result;
use crate::models::ReviewId;
use crate::notice::{Notice, Notifier};
use crate::remote::RemoteApi;
use crate::state::SyncState;

/// A pending review that reached the server during a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayedReview {
    pub local_id: ReviewId,
    pub server_id: ReviewId,
}

/// Outcome of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Reviews replayed and swapped for their server copy
    pub replayed: Vec<ReplayedReview>,
    /// Pending reviews left for a later sweep
    pub remaining: usize,
    /// Pending reviews the API answered but did not accept
    pub rejected: usize,
    /// The sweep stopped because the API was unreachable
    pub stopped_offline: bool,
}

impl SyncReport {
    /// Summarise the sweep as a sync state.
    pub const fn state(&self) -> SyncState {
        if self.stopped_offline {
            SyncState::Offline
        } else if self.remaining > 0 {
            SyncState::Error
        } else {
            SyncState::Synced
        }
    }
}

/// Replay key sent with a pending review; stable across sweeps.
pub fn idempotency_key(local_id: ReviewId) -> String {
    format!("pending-review-{}", local_id.get().unsigned_abs())
}

/// Run one sync sweep over the local review collection.
///
/// Fails only when the local store cannot be read; per-review failures are
/// logged and leave the review pending. Only an unreachable or failing API
/// (transport error or 5xx) ends the sweep early.
pub async fn sweep_pending_reviews<R: RemoteApi>(
    store: &LocalStore,
    remote: &R,
    notifier: &dyn Notifier,
) -> Result<SyncReport> {
    let reviews = store.scan_reviews().await?;
    let pending = reviews
        .iter()
        .take_while(|review| review.id.is_pending())
        .count();

    let mut report = SyncReport::default();
    if pending == 0 {
        tracing::debug!("No pending reviews to sync");
        return Ok(report);
    }
    tracing::info!(pending, "Syncing pending reviews");

    for review in &reviews {
        if !review.id.is_pending() {
            break;
        }

        let key = idempotency_key(review.id);
        let server = match remote.post_review(&review.to_draft(), Some(&key)).await {
            Ok(server) => server,
            Err(error) if error.is_network() => {
                tracing::warn!(id = %review.id, "API unreachable, sync sweep stopped: {error}");
                report.stopped_offline = true;
                break;
            }
            Err(error) => {
                tracing::warn!(id = %review.id, "Pending review rejected, keeping it: {error}");
                report.rejected += 1;
                continue;
            }
        };

        if let Err(error) = store.replace_pending_review(review.id, &server).await {
            tracing::warn!(
                id = %review.id,
                server_id = %server.id,
                "Review posted but the local copy was not replaced; it will be resubmitted: {error}"
            );
            continue;
        }

        tracing::info!(id = %review.id, server_id = %server.id, "Synced pending review");
        notifier.notify(Notice::success(format!(
            "Your review of restaurant {} is now public.",
            server.restaurant_id
        )));
        report.replayed.push(ReplayedReview {
            local_id: review.id,
            server_id: server.id,
        });
    }

    report.remaining = pending - report.replayed.len();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::error::Error;
    use crate::models::{NewReview, Restaurant, Review};
    use crate::notice::CollectingNotifier;

    #[derive(Default)]
    struct FakeRemote {
        offline: AtomicBool,
        next_id: AtomicI64,
        posted: Mutex<Vec<(NewReview, Option<String>)>>,
        refused_comments: Vec<&'static str>,
    }

    impl FakeRemote {
        fn online() -> Self {
            Self {
                next_id: AtomicI64::new(100),
                ..Self::default()
            }
        }
    }

    impl RemoteApi for FakeRemote {
        async fn fetch_all(&self) -> Result<Vec<Restaurant>> {
            Ok(Vec::new())
        }

        async fn fetch_reviews(&self, _restaurant_id: i64) -> Result<Vec<Review>> {
            Ok(Vec::new())
        }

        async fn post_review(
            &self,
            review: &NewReview,
            idempotency_key: Option<&str>,
        ) -> Result<Review> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(Error::api(503, "HTTP 503"));
            }
            if self.refused_comments.iter().any(|refused| *refused == review.comments) {
                return Err(Error::api(400, "comments rejected (400)"));
            }
            self.posted
                .lock()
                .unwrap()
                .push((review.clone(), idempotency_key.map(ToString::to_string)));
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            Ok(review.clone().with_id(ReviewId::new(id)))
        }
    }

    async fn stage(store: &LocalStore, restaurant_id: i64, comments: &str) -> Review {
        store
            .put_review(NewReview::new(restaurant_id, "Ada", 4, comments), None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn sweep_replaces_pending_with_server_copy() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let remote = FakeRemote::online();
        let notifier = CollectingNotifier::new();
        let pending = stage(&store, 3, "Lovely").await;

        let report = sweep_pending_reviews(&store, &remote, &notifier)
            .await
            .unwrap();

        assert_eq!(report.replayed.len(), 1);
        assert_eq!(report.replayed[0].local_id, pending.id);
        assert_eq!(report.remaining, 0);
        assert_eq!(report.state(), SyncState::Synced);

        let reviews = store.scan_reviews().await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].id, ReviewId::new(100));
        assert!(!reviews.iter().any(|review| review.id == pending.id));
        assert_eq!(notifier.drain().len(), 1);
    }

    #[tokio::test]
    async fn sweep_sends_draft_without_id_and_with_key() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let remote = FakeRemote::online();
        let pending = stage(&store, 3, "Lovely").await;

        sweep_pending_reviews(&store, &remote, &CollectingNotifier::new())
            .await
            .unwrap();

        let posted = remote.posted.lock().unwrap();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].0, pending.to_draft());
        assert_eq!(posted[0].1.as_deref(), Some(idempotency_key(pending.id).as_str()));
    }

    #[tokio::test]
    async fn sweep_stops_at_first_synced_review() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let remote = FakeRemote::online();
        store
            .put_review(NewReview::new(1, "Bob", 5, "Old"), Some(ReviewId::new(5)))
            .await
            .unwrap();
        stage(&store, 1, "First").await;
        stage(&store, 2, "Second").await;

        let report = sweep_pending_reviews(&store, &remote, &CollectingNotifier::new())
            .await
            .unwrap();

        assert_eq!(report.replayed.len(), 2);
        assert_eq!(remote.posted.lock().unwrap().len(), 2);
        assert!(store.pending_reviews().await.unwrap().is_empty());
        assert_eq!(store.scan_reviews().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn sweep_keeps_reviews_when_offline() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let remote = FakeRemote::online();
        remote.offline.store(true, Ordering::SeqCst);
        let pending = stage(&store, 3, "Lovely").await;

        let report = sweep_pending_reviews(&store, &remote, &CollectingNotifier::new())
            .await
            .unwrap();

        assert!(report.replayed.is_empty());
        assert_eq!(report.remaining, 1);
        assert_eq!(report.state(), SyncState::Offline);
        assert_eq!(store.pending_reviews().await.unwrap(), vec![pending]);
    }

    #[tokio::test]
    async fn rejected_review_does_not_block_older_ones() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let remote = FakeRemote {
            refused_comments: vec!["bad"],
            ..FakeRemote::online()
        };
        let good = stage(&store, 3, "good").await;
        let bad = stage(&store, 3, "bad").await;
        assert!(bad.id < good.id);

        let first = sweep_pending_reviews(&store, &remote, &CollectingNotifier::new())
            .await
            .unwrap();
        assert_eq!(first.replayed.len(), 1);
        assert_eq!(first.replayed[0].local_id, good.id);
        assert_eq!(first.rejected, 1);
        assert_eq!(first.remaining, 1);
        assert!(!first.stopped_offline);
        assert_eq!(first.state(), SyncState::Error);

        let second = sweep_pending_reviews(&store, &remote, &CollectingNotifier::new())
            .await
            .unwrap();
        assert!(second.replayed.is_empty());
        assert_eq!(second.rejected, 1);
        assert_eq!(store.pending_reviews().await.unwrap(), vec![bad]);
    }

    #[tokio::test]
    async fn sweep_on_unavailable_store_fails() {
        let remote = FakeRemote::online();
        let result =
            sweep_pending_reviews(&LocalStore::unavailable(), &remote, &CollectingNotifier::new())
                .await;
        assert!(matches!(result, Err(Error::LocalStoreUnavailable(_))));
    }

    #[test]
    fn idempotency_key_is_stable() {
        let id = ReviewId::new(-1_700_000_000_000);
        assert_eq!(idempotency_key(id), "pending-review-1700000000000");
        assert_eq!(idempotency_key(id), idempotency_key(id));
    }
}
