use log::debug;
use std::sync::Arc;

use crate::datastore::{ChangeEvent, ChannelHandle, DataStore, Table};

type Predicate = Box<dyn Fn(&ChangeEvent) -> bool + Send + Sync>;
type Refresh = Box<dyn Fn() + Send + Sync>;

/// Push-then-pull glue: a relevance check in front of a refresh callback.
///
/// Knows nothing about the transport; a store channel, a test or anything
/// else can feed it events.
pub struct RefreshSubject {
    predicate: Predicate,
    on_refresh: Refresh,
}

impl RefreshSubject {
    pub fn new(
        predicate: impl Fn(&ChangeEvent) -> bool + Send + Sync + 'static,
        on_refresh: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            on_refresh: Box::new(on_refresh),
        }
    }

    /// Fires the refresh callback if `event` is relevant. Returns whether it fired.
    pub fn notify(&self, event: &ChangeEvent) -> bool {
        if (self.predicate)(event) {
            (self.on_refresh)();
            true
        } else {
            debug!("Ignoring {} change on {}", event.kind.as_str(), event.table);
            false
        }
    }
}

/// A standing change channel. Dropping it unregisters the listener.
pub struct Subscription {
    store: Arc<dyn DataStore>,
    handle: ChannelHandle,
}

impl Subscription {
    pub fn open(
        store: Arc<dyn DataStore>,
        table: Table,
        row_id: Option<&str>,
        subject: RefreshSubject,
    ) -> Self {
        let subject = Arc::new(subject);
        let handle = store.subscribe_changes(
            table,
            row_id,
            Arc::new(move |event| {
                subject.notify(event);
            }),
        );
        Self { store, handle }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.store.unsubscribe(self.handle);
    }
}
