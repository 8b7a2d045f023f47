use log::warn;

use super::collection::LoadState;
use super::feed::Feed;
use super::subject::RefreshSubject;
use crate::datastore::{DataStore, Filter, decode_rows};

/// A single-row view (announcement or event detail).
///
/// The row is looked up with the audience's visibility filter; a hidden or
/// deleted row reads as "not available", which is an ordinary state here.
pub struct LiveItem<F: Feed> {
    feed: F,
    id: String,
    item: Option<F::Item>,
    state: LoadState,
    error: Option<String>,
}

impl<F: Feed> LiveItem<F> {
    pub fn new(feed: F, id: impl Into<String>) -> Self {
        Self {
            feed,
            id: id.into(),
            item: None,
            state: LoadState::Idle,
            error: None,
        }
    }

    pub fn item(&self) -> Option<&F::Item> {
        self.item.as_ref()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn load(&mut self, store: &dyn DataStore) {
        if self.id.trim().is_empty() {
            self.state = LoadState::Error;
            self.error = Some(F::MESSAGES.invalid_id.to_string());
            return;
        }

        self.state = LoadState::Loading;
        let mut filters = vec![Filter::eq("id", self.id.clone())];
        filters.extend(self.feed.visibility());

        let result = store
            .query(F::TABLE, &filters, None)
            .and_then(decode_rows::<F::Item>);

        match result {
            Ok(rows) => match rows.into_iter().next() {
                Some(item) => {
                    self.item = Some(item);
                    self.error = None;
                    self.state = LoadState::Ready;
                }
                None => {
                    self.item = None;
                    self.error = Some(F::MESSAGES.not_found.to_string());
                    self.state = LoadState::Error;
                }
            },
            Err(e) => {
                warn!("Loading {} {} failed: {}", F::TABLE, self.id, e);
                self.error = Some(F::MESSAGES.item_failed.to_string());
                self.state = LoadState::Error;
            }
        }
    }

    /// Any change to this row triggers `on_refresh`.
    pub fn subject(&self, on_refresh: impl Fn() + Send + Sync + 'static) -> RefreshSubject {
        let id = self.id.clone();
        RefreshSubject::new(move |event| event.row_id() == Some(id.as_str()), on_refresh)
    }
}
