use chrono::{DateTime, Utc};
use log::{debug, warn};

use super::feed::Feed;
use super::subject::RefreshSubject;
use crate::datastore::{DataStore, StoreError, decode_rows};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Error,
}

/// Identifies one issued fetch. Later tickets always carry larger sequence numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub issued_at: DateTime<Utc>,
}

/// The last good snapshot of one collection plus its load status.
///
/// Snapshots are replaced wholesale. A failed fetch keeps the old snapshot and
/// only records an error. When fetches overlap, the most recently issued one is
/// authoritative: a completion older than what is already applied is dropped.
pub struct LiveCollection<F: Feed> {
    feed: F,
    items: Vec<F::Item>,
    state: LoadState,
    error: Option<String>,
    last_updated: Option<DateTime<Utc>>,
    issued: u64,
    applied: u64,
}

impl<F: Feed> LiveCollection<F> {
    pub fn new(feed: F) -> Self {
        Self {
            feed,
            items: Vec::new(),
            state: LoadState::Idle,
            error: None,
            last_updated: None,
            issued: 0,
            applied: 0,
        }
    }

    pub fn items(&self) -> &[F::Item] {
        &self.items
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn begin_fetch(&mut self, now: DateTime<Utc>) -> FetchTicket {
        self.issued += 1;
        self.state = LoadState::Loading;
        FetchTicket {
            seq: self.issued,
            issued_at: now,
        }
    }

    /// Runs the query for `ticket`. Does not touch cached state.
    pub fn fetch(
        &self,
        store: &dyn DataStore,
        ticket: &FetchTicket,
    ) -> Result<Vec<F::Item>, StoreError> {
        let rows = store.query(
            F::TABLE,
            &self.feed.filters(ticket.issued_at),
            Some(self.feed.order()),
        )?;
        decode_rows(rows)
    }

    /// Applies a completed fetch. Returns `false` when the result was stale and dropped.
    pub fn apply(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<F::Item>, StoreError>,
    ) -> bool {
        if ticket.seq <= self.applied {
            debug!(
                "Dropping stale {} fetch #{} (already applied #{})",
                F::TABLE,
                ticket.seq,
                self.applied
            );
            return false;
        }
        self.applied = ticket.seq;
        let latest = ticket.seq == self.issued;

        match result {
            Ok(items) => {
                self.items = items;
                self.last_updated = Some(Utc::now());
                if latest {
                    self.error = None;
                    self.state = LoadState::Ready;
                }
            }
            Err(e) => {
                warn!("Loading {} failed: {}", F::TABLE, e);
                if latest {
                    self.error = Some(F::MESSAGES.load_failed.to_string());
                    self.state = LoadState::Error;
                }
            }
        }
        true
    }

    pub fn load(&mut self, store: &dyn DataStore) -> bool {
        let ticket = self.begin_fetch(Utc::now());
        let result = self.fetch(store, &ticket);
        self.apply(ticket, result)
    }

    /// Manual pull-to-refresh; same as [`load`](Self::load).
    pub fn refresh(&mut self, store: &dyn DataStore) -> bool {
        self.load(store)
    }

    /// A subject that fires `on_refresh` for change events this collection cares about.
    pub fn subject(&self, on_refresh: impl Fn() + Send + Sync + 'static) -> RefreshSubject {
        let feed = self.feed.clone();
        RefreshSubject::new(move |event| feed.is_relevant(event), on_refresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::memory::MemoryStore;
    use crate::datastore::{DataStore, Table};
    use crate::live::feed::{Audience, EventFeed, NewsFeed};
    use crate::live::subject::Subscription;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn news(id: &str, published: bool, at: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": format!("Notice {}", id),
            "content": "Details inside",
            "image_url": null,
            "is_published": published,
            "published_at": at,
            "created_at": at,
            "created_by": null,
        })
    }

    fn ids(col: &LiveCollection<NewsFeed>) -> Vec<&str> {
        col.items().iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn load_filters_and_orders() {
        let store = MemoryStore::new();
        store.seed(Table::Announcements, news("a", true, "2026-01-01T00:00:00Z"));
        store.seed(Table::Announcements, news("b", false, "2026-01-02T00:00:00Z"));
        store.seed(Table::Announcements, news("c", true, "2026-01-03T00:00:00Z"));

        let mut col = LiveCollection::new(NewsFeed::default());
        assert_eq!(col.state(), LoadState::Idle);
        assert!(col.load(&store));
        assert_eq!(col.state(), LoadState::Ready);
        assert_eq!(ids(&col), vec!["c", "a"]);
        assert!(col.last_updated().is_some());

        let mut admin = LiveCollection::new(NewsFeed {
            audience: Audience::Admin,
        });
        admin.load(&store);
        assert_eq!(admin.items().len(), 3);
    }

    #[test]
    fn failed_refresh_keeps_previous_items() {
        let store = MemoryStore::new();
        store.seed(Table::Announcements, news("a", true, "2026-01-01T00:00:00Z"));
        let mut col = LiveCollection::new(NewsFeed::default());
        col.load(&store);
        let stamped = col.last_updated();

        store.set_failing(true);
        col.refresh(&store);

        assert_eq!(col.state(), LoadState::Error);
        assert_eq!(ids(&col), vec!["a"]);
        assert_eq!(col.error(), Some("Unable to load announcements. Please try again."));
        assert_eq!(col.last_updated(), stamped);

        store.set_failing(false);
        col.refresh(&store);
        assert_eq!(col.state(), LoadState::Ready);
        assert_eq!(col.error(), None);
    }

    #[test]
    fn first_load_failure_leaves_empty_collection() {
        let store = MemoryStore::new();
        store.set_failing(true);
        let mut col = LiveCollection::new(NewsFeed::default());
        col.load(&store);
        assert_eq!(col.state(), LoadState::Error);
        assert!(col.items().is_empty());
    }

    #[test]
    fn older_fetch_cannot_overwrite_newer() {
        let store = MemoryStore::new();
        store.seed(Table::Announcements, news("a", true, "2026-01-01T00:00:00Z"));
        let mut col = LiveCollection::new(NewsFeed::default());

        let first = col.begin_fetch(Utc::now());
        let stale = col.fetch(&store, &first);

        store.seed(Table::Announcements, news("b", true, "2026-01-02T00:00:00Z"));
        let second = col.begin_fetch(Utc::now());
        let fresh = col.fetch(&store, &second);

        assert!(col.apply(second, fresh));
        assert!(!col.apply(first, stale));
        assert_eq!(ids(&col), vec!["b", "a"]);
        assert_eq!(col.state(), LoadState::Ready);
    }

    #[test]
    fn earlier_completion_stays_loading_until_latest_lands() {
        let store = MemoryStore::new();
        let mut col = LiveCollection::new(NewsFeed::default());
        let first = col.begin_fetch(Utc::now());
        let second = col.begin_fetch(Utc::now());

        let result = col.fetch(&store, &first);
        assert!(col.apply(first, result));
        assert!(col.is_loading());

        let result = col.fetch(&store, &second);
        assert!(col.apply(second, result));
        assert_eq!(col.state(), LoadState::Ready);
    }

    #[test]
    fn past_events_are_not_listed() {
        let store = MemoryStore::new();
        for (id, start) in [("old", "2000-01-01T10:00:00Z"), ("new", "2999-01-01T10:00:00Z")] {
            store.seed(
                Table::Events,
                json!({
                    "id": id,
                    "title": id,
                    "description": null,
                    "location": null,
                    "start_time": start,
                    "end_time": null,
                    "capacity": 40,
                    "image_url": null,
                    "is_published": true,
                    "created_at": "2000-01-01T00:00:00Z",
                }),
            );
        }
        let mut col = LiveCollection::new(EventFeed::default());
        col.load(&store);
        let ids: Vec<&str> = col.items().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["new"]);
    }

    #[test]
    fn publishing_a_draft_surfaces_it_after_notification() {
        let store = Arc::new(MemoryStore::new());
        let mut col = LiveCollection::new(NewsFeed::default());
        col.load(store.as_ref());

        let pending = Arc::new(AtomicUsize::new(0));
        let flag = pending.clone();
        let subject = col.subject(move || {
            flag.fetch_add(1, Ordering::SeqCst);
        });
        let shared: Arc<dyn DataStore> = store.clone();
        let _sub = Subscription::open(shared, Table::Announcements, None, subject);

        let draft = news("d", false, "2026-02-01T00:00:00Z");
        store
            .insert(Table::Announcements, draft.as_object().cloned().unwrap())
            .unwrap();
        assert_eq!(pending.load(Ordering::SeqCst), 0, "draft insert is not relevant");
        col.load(store.as_ref());
        assert!(col.items().is_empty());

        store
            .update(
                Table::Announcements,
                "d",
                json!({"is_published": true}).as_object().cloned().unwrap(),
            )
            .unwrap();
        assert_eq!(pending.load(Ordering::SeqCst), 1);

        col.load(store.as_ref());
        assert_eq!(ids(&col), vec!["d"]);
    }
}
