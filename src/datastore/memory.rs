//! In-memory `DataStore` used by tests.
//!
//! Notifications are dispatched synchronously from the writing call, and
//! reads can be made to fail on demand.

use serde_json::Value;
use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::registry::SubscriberRegistry;
use super::{
    ChangeCallback, ChangeEvent, ChangeKind, ChannelHandle, DataStore, Filter, OrderBy, Row,
    StoreError, Table, compare_values,
};

#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<Table, Vec<Row>>>,
    registry: SubscriberRegistry,
    failing: AtomicBool,
    queries: AtomicUsize,
    next_id: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent reads and writes fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// Inserts without notifying, for test fixtures.
    pub fn seed(&self, table: Table, row: Value) {
        if let (Ok(mut rows), Value::Object(row)) = (self.rows.lock(), row) {
            rows.entry(table).or_default().push(row);
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("network unreachable".to_string()));
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Table, Vec<Row>>>, StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Unavailable("poisoned".to_string()))
    }
}

impl DataStore for MemoryStore {
    fn query(
        &self,
        table: Table,
        filters: &[Filter],
        order: Option<OrderBy>,
    ) -> Result<Vec<Row>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let rows = self.lock()?;
        let mut matched: Vec<Row> = rows
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filters.iter().all(|f| f.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some(order) = order {
            matched.sort_by(|a, b| {
                let ord = match (a.get(order.column), b.get(order.column)) {
                    (Some(a), Some(b)) => compare_values(a, b).unwrap_or(CmpOrdering::Equal),
                    _ => CmpOrdering::Equal,
                };
                if order.ascending { ord } else { ord.reverse() }
            });
        }
        Ok(matched)
    }

    fn insert(&self, table: Table, mut row: Row) -> Result<String, StoreError> {
        self.check()?;
        let id = match row.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = format!("mem-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
                row.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };
        self.lock()?.entry(table).or_default().push(row.clone());
        self.registry.dispatch(&ChangeEvent {
            table,
            kind: ChangeKind::Insert,
            old: None,
            new: Some(row),
        });
        Ok(id)
    }

    fn update(&self, table: Table, id: &str, patch: Row) -> Result<(), StoreError> {
        self.check()?;
        let (old, new) = {
            let mut rows = self.lock()?;
            let row = rows
                .get_mut(&table)
                .and_then(|rows| {
                    rows.iter_mut()
                        .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
                })
                .ok_or(StoreError::NotFound)?;
            let old = row.clone();
            for (key, value) in patch {
                row.insert(key, value);
            }
            (old, row.clone())
        };
        self.registry.dispatch(&ChangeEvent {
            table,
            kind: ChangeKind::Update,
            old: Some(old),
            new: Some(new),
        });
        Ok(())
    }

    fn delete(&self, table: Table, id: &str) -> Result<(), StoreError> {
        self.check()?;
        let old = {
            let mut rows = self.lock()?;
            let rows = rows.get_mut(&table).ok_or(StoreError::NotFound)?;
            let idx = rows
                .iter()
                .position(|r| r.get("id").and_then(Value::as_str) == Some(id))
                .ok_or(StoreError::NotFound)?;
            rows.remove(idx)
        };
        self.registry.dispatch(&ChangeEvent {
            table,
            kind: ChangeKind::Delete,
            old: Some(old),
            new: None,
        });
        Ok(())
    }

    fn subscribe_changes(
        &self,
        table: Table,
        row_id: Option<&str>,
        callback: ChangeCallback,
    ) -> ChannelHandle {
        self.registry.register(table, row_id, callback)
    }

    fn unsubscribe(&self, handle: ChannelHandle) {
        self.registry.remove(handle);
    }
}
