use log::debug;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{ChangeCallback, ChangeEvent, ChannelHandle, Table};

struct Subscriber {
    table: Table,
    row_id: Option<String>,
    callback: ChangeCallback,
}

/// Subscriber bookkeeping shared by store backends.
#[derive(Default)]
pub struct SubscriberRegistry {
    next: AtomicU64,
    subscribers: Mutex<BTreeMap<ChannelHandle, Subscriber>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        table: Table,
        row_id: Option<&str>,
        callback: ChangeCallback,
    ) -> ChannelHandle {
        let handle = ChannelHandle(self.next.fetch_add(1, Ordering::Relaxed) + 1);
        let subscriber = Subscriber {
            table,
            row_id: row_id.map(str::to_string),
            callback,
        };
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.insert(handle, subscriber);
        }
        debug!("Opened change channel {:?} on {}", handle, table);
        handle
    }

    pub fn remove(&self, handle: ChannelHandle) {
        if let Ok(mut subs) = self.subscribers.lock() {
            if subs.remove(&handle).is_some() {
                debug!("Closed change channel {:?}", handle);
            }
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Delivers `event` to every matching subscriber. Returns how many were called.
    ///
    /// Callbacks run after the lock is released so they may subscribe or unsubscribe.
    pub fn dispatch(&self, event: &ChangeEvent) -> usize {
        let targets: Vec<ChangeCallback> = match self.subscribers.lock() {
            Ok(subs) => subs
                .values()
                .filter(|s| s.table == event.table)
                .filter(|s| match &s.row_id {
                    Some(id) => event.row_id() == Some(id.as_str()),
                    None => true,
                })
                .map(|s| s.callback.clone())
                .collect(),
            Err(_) => return 0,
        };
        for callback in &targets {
            callback(event);
        }
        targets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::{ChangeKind, Row};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    fn event(table: Table, id: &str) -> ChangeEvent {
        let row: Row = json!({ "id": id }).as_object().cloned().unwrap();
        ChangeEvent {
            table,
            kind: ChangeKind::Update,
            old: Some(row.clone()),
            new: Some(row),
        }
    }

    #[test]
    fn dispatch_respects_table_and_row_filter() {
        let registry = SubscriberRegistry::new();
        let all = Arc::new(AtomicUsize::new(0));
        let one = Arc::new(AtomicUsize::new(0));

        let counter = all.clone();
        registry.register(
            Table::Events,
            None,
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let counter = one.clone();
        registry.register(
            Table::Events,
            Some("e2"),
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        registry.dispatch(&event(Table::Events, "e1"));
        registry.dispatch(&event(Table::Events, "e2"));
        registry.dispatch(&event(Table::Announcements, "e2"));

        assert_eq!(all.load(Ordering::SeqCst), 2);
        assert_eq!(one.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn removed_channel_stops_receiving() {
        let registry = SubscriberRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let handle = registry.register(
            Table::PrayerTimes,
            None,
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        registry.dispatch(&event(Table::PrayerTimes, "p1"));
        registry.remove(handle);
        registry.dispatch(&event(Table::PrayerTimes, "p1"));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 0);
    }
}
