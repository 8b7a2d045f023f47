use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, warn};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params_from_iter};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::datastore::registry::SubscriberRegistry;
use crate::datastore::{
    ChangeCallback, ChannelHandle, ColumnKind, DataStore, Filter, OrderBy, Row, StoreError, Table,
};
use crate::db::migrations::run_migrations;
use crate::db::watcher::ChangeWatcher;
use crate::models::time::timestamp;

/// `DataStore` over a SQLite file.
///
/// Change notifications come from the `change_log` table that the schema
/// triggers fill, so writes from other processes are observed too. The feed
/// only runs after [`SqliteStore::with_change_feed`].
pub struct SqliteStore {
    path: PathBuf,
    conn: Mutex<Connection>,
    registry: Arc<SubscriberRegistry>,
    watcher: Option<ChangeWatcher>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Opening database at {:?}", path))?;

        // WAL lets the board read while the admin CLI writes
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(Duration::from_secs(5))?;

        run_migrations(&conn)?;
        conn.execute(
            "DELETE FROM change_log WHERE created_at < datetime('now', '-1 day')",
            [],
        )?;

        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
            registry: Arc::new(SubscriberRegistry::new()),
            watcher: None,
        })
    }

    /// Starts polling `change_log` every `interval` and dispatching to subscribers.
    pub fn with_change_feed(mut self, interval: Duration) -> Result<Self> {
        let watcher = ChangeWatcher::spawn(&self.path, interval, self.registry.clone())?;
        self.watcher = Some(watcher);
        Ok(self)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))
    }
}

impl Drop for SqliteStore {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.stop();
        }
    }
}

fn to_sql(value: &Value) -> Result<SqlValue, StoreError> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => {
            return Err(StoreError::Unavailable(format!(
                "cannot store nested value {}",
                other
            )));
        }
    })
}

/// Checks every key of `row` against the table schema.
fn validate_columns(table: Table, row: &Row) -> Result<(), StoreError> {
    for key in row.keys() {
        table.column(key)?;
    }
    Ok(())
}

impl DataStore for SqliteStore {
    fn query(
        &self,
        table: Table,
        filters: &[Filter],
        order: Option<OrderBy>,
    ) -> Result<Vec<Row>, StoreError> {
        let columns = table.columns();
        let select: Vec<&str> = columns.iter().map(|c| c.name).collect();
        let mut sql = format!("SELECT {} FROM {}", select.join(", "), table.name());

        let mut args = Vec::with_capacity(filters.len());
        for (i, filter) in filters.iter().enumerate() {
            let column = table.column(filter.column())?;
            let op = match filter {
                Filter::Eq(..) => "=",
                Filter::Gte(..) => ">=",
            };
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(&format!("{} {} ?{}", column.name, op, i + 1));
            args.push(to_sql(filter.value())?);
        }

        if let Some(order) = order {
            let column = table.column(order.column)?;
            sql.push_str(&format!(
                " ORDER BY {} {}",
                column.name,
                if order.ascending { "ASC" } else { "DESC" }
            ));
        }

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(args.iter()))?;

        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut out = Row::new();
            for (i, column) in columns.iter().enumerate() {
                let value = match column.kind {
                    ColumnKind::Text => row
                        .get::<_, Option<String>>(i)?
                        .map(Value::String)
                        .unwrap_or(Value::Null),
                    ColumnKind::Integer => row
                        .get::<_, Option<i64>>(i)?
                        .map(Value::from)
                        .unwrap_or(Value::Null),
                    ColumnKind::Bool => row
                        .get::<_, Option<i64>>(i)?
                        .map(|v| Value::Bool(v != 0))
                        .unwrap_or(Value::Null),
                };
                out.insert(column.name.to_string(), value);
            }
            result.push(out);
        }
        debug!("{} rows from {} ({} filters)", result.len(), table, filters.len());
        Ok(result)
    }

    fn insert(&self, table: Table, mut row: Row) -> Result<String, StoreError> {
        let id = match row.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                row.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };
        validate_columns(table, &row)?;

        let names: Vec<&str> = row.keys().map(String::as_str).collect();
        let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.name(),
            names.join(", "),
            placeholders.join(", ")
        );
        let args = row.values().map(to_sql).collect::<Result<Vec<_>, _>>()?;

        self.lock()?.execute(&sql, params_from_iter(args.iter()))?;
        Ok(id)
    }

    fn update(&self, table: Table, id: &str, mut patch: Row) -> Result<(), StoreError> {
        patch.remove("id");
        if patch.is_empty() {
            return Ok(());
        }
        validate_columns(table, &patch)?;
        if table.column("updated_at").is_ok() && !patch.contains_key("updated_at") {
            patch.insert(
                "updated_at".to_string(),
                Value::String(timestamp::format(&Utc::now())),
            );
        }

        let assignments: Vec<String> = patch
            .keys()
            .enumerate()
            .map(|(i, name)| format!("{} = ?{}", name, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table.name(),
            assignments.join(", "),
            patch.len() + 1
        );
        let mut args = patch.values().map(to_sql).collect::<Result<Vec<_>, _>>()?;
        args.push(SqlValue::Text(id.to_string()));

        let changed = self.lock()?.execute(&sql, params_from_iter(args.iter()))?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn delete(&self, table: Table, id: &str) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", table.name());
        let changed = self.lock()?.execute(&sql, [id])?;
        if changed == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn subscribe_changes(
        &self,
        table: Table,
        row_id: Option<&str>,
        callback: ChangeCallback,
    ) -> ChannelHandle {
        if self.watcher.is_none() {
            warn!("Subscribed to {} without a running change feed", table);
        }
        self.registry.register(table, row_id, callback)
    }

    fn unsubscribe(&self, handle: ChannelHandle) {
        self.registry.remove(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::ChangeKind;
    use serde_json::json;
    use std::sync::mpsc;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    fn open_temp() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("jamaat.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn query_filters_and_orders() {
        let (_dir, store) = open_temp();
        for (id, published, at) in [
            ("a", true, "2026-01-01T09:00:00Z"),
            ("b", false, "2026-01-02T09:00:00Z"),
            ("c", true, "2026-01-03T09:00:00Z"),
        ] {
            store
                .insert(
                    Table::Announcements,
                    row(json!({
                        "id": id,
                        "title": format!("Item {}", id),
                        "content": "body",
                        "is_published": published,
                        "published_at": at,
                    })),
                )
                .unwrap();
        }

        let rows = store
            .query(
                Table::Announcements,
                &[Filter::eq("is_published", true)],
                Some(OrderBy::desc("published_at")),
            )
            .unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["c", "a"]);
        assert_eq!(rows[0]["is_published"], Value::Bool(true));
        assert_eq!(rows[0]["image_url"], Value::Null);
    }

    #[test]
    fn seeded_prayer_times_decode() {
        let (_dir, store) = open_temp();
        let rows = store
            .query(Table::PrayerTimes, &[], Some(OrderBy::asc("display_order")))
            .unwrap();
        let slots: Vec<crate::models::PrayerSlot> = crate::datastore::decode_rows(rows).unwrap();
        assert_eq!(slots.len(), 6);
        assert_eq!(slots[0].name, crate::models::PrayerName::Fajr);
    }

    #[test]
    fn update_and_delete_report_missing_rows() {
        let (_dir, store) = open_temp();
        let err = store
            .update(Table::Events, "nope", row(json!({"title": "x"})))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        assert!(matches!(
            store.delete(Table::Events, "nope"),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn rejects_unknown_columns() {
        let (_dir, store) = open_temp();
        let err = store
            .insert(Table::ContactCategories, row(json!({"name": "x", "bogus": 1})))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownColumn(..)));
    }

    #[test]
    fn change_feed_delivers_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("jamaat.db"))
            .unwrap()
            .with_change_feed(Duration::from_millis(20))
            .unwrap();

        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        store.subscribe_changes(
            Table::Events,
            None,
            Arc::new(move |event| {
                if let Ok(tx) = tx.lock() {
                    let _ = tx.send(event.clone());
                }
            }),
        );

        let id = store
            .insert(
                Table::Events,
                row(json!({
                    "title": "Community iftar",
                    "start_time": "2030-03-01T18:00:00Z",
                    "is_published": true,
                })),
            )
            .unwrap();
        store.delete(Table::Events, &id).unwrap();

        let inserted = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(inserted.kind, ChangeKind::Insert);
        assert_eq!(inserted.row_id(), Some(id.as_str()));
        assert_eq!(inserted.new_flag("is_published"), Some(true));

        let deleted = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(deleted.kind, ChangeKind::Delete);
        assert_eq!(deleted.old_flag("is_published"), Some(true));
    }
}
