use anyhow::{Context, Result};
use log::{debug, error, warn};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::datastore::registry::SubscriberRegistry;
use crate::datastore::{ChangeEvent, ChangeKind, Row, StoreError, Table};

/// Background thread tailing `change_log` and feeding the subscriber registry.
pub struct ChangeWatcher {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

struct LogEntry {
    id: i64,
    table: String,
    kind: String,
    old_row: Option<String>,
    new_row: Option<String>,
}

impl ChangeWatcher {
    pub fn spawn(path: &Path, interval: Duration, registry: Arc<SubscriberRegistry>) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Opening change feed at {:?}", path))?;
        conn.busy_timeout(Duration::from_secs(5))?;

        // Only changes made after startup are delivered
        let start: i64 = conn.query_row("SELECT COALESCE(MAX(id), 0) FROM change_log", [], |row| {
            row.get(0)
        })?;

        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let handle = thread::Builder::new()
            .name("change-feed".to_string())
            .spawn(move || poll_loop(conn, start, interval, registry, flag))
            .context("Spawning change feed thread")?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    pub fn stop(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Change feed thread panicked");
            }
        }
    }
}

fn poll_loop(
    conn: Connection,
    mut last_id: i64,
    interval: Duration,
    registry: Arc<SubscriberRegistry>,
    stop: Arc<AtomicBool>,
) {
    let step = interval.min(Duration::from_millis(50)).max(Duration::from_millis(1));
    while !stop.load(Ordering::SeqCst) {
        let mut waited = Duration::ZERO;
        while waited < interval && !stop.load(Ordering::SeqCst) {
            thread::sleep(step);
            waited += step;
        }
        if stop.load(Ordering::SeqCst) {
            break;
        }

        match read_since(&conn, last_id) {
            Ok(entries) => {
                for entry in entries {
                    last_id = entry.id;
                    match to_event(entry) {
                        Ok(event) => {
                            let delivered = registry.dispatch(&event);
                            debug!(
                                "{} {} delivered to {} channel(s)",
                                event.kind.as_str(),
                                event.table,
                                delivered
                            );
                        }
                        Err(e) => warn!("Skipping malformed change entry: {}", e),
                    }
                }
            }
            // A dropped feed only stops refreshes; the board keeps its data
            Err(e) => error!("Change feed read failed: {}", e),
        }
    }
}

fn read_since(conn: &Connection, last_id: i64) -> Result<Vec<LogEntry>, StoreError> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, table_name, kind, old_row, new_row FROM change_log WHERE id > ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![last_id], |row| {
        Ok(LogEntry {
            id: row.get(0)?,
            table: row.get(1)?,
            kind: row.get(2)?,
            old_row: row.get(3)?,
            new_row: row.get(4)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
}

fn parse_image(image: Option<String>) -> Result<Option<Row>, StoreError> {
    image
        .map(|text| serde_json::from_str::<Row>(&text).map_err(StoreError::from))
        .transpose()
}

fn to_event(entry: LogEntry) -> Result<ChangeEvent, StoreError> {
    Ok(ChangeEvent {
        table: entry.table.parse::<Table>()?,
        kind: entry.kind.parse::<ChangeKind>()?,
        old: parse_image(entry.old_row)?,
        new: parse_image(entry.new_row)?,
    })
}
