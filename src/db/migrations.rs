use anyhow::Result;
use rusqlite::{Connection, params};

use crate::datastore::{ColumnKind, Table};
use crate::models::PrayerName;

const NOW_TEXT: &str = "(strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))";

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS prayer_times (
            id             TEXT PRIMARY KEY,
            prayer_name    TEXT NOT NULL
                           CHECK(prayer_name IN ('Fajr','Dhuhr','Asr','Maghrib','Isha','Jummah')),
            adhan_time     TEXT,
            iqama_time     TEXT NOT NULL,
            is_active      INTEGER NOT NULL DEFAULT 1,
            display_order  INTEGER NOT NULL DEFAULT 0,
            notes          TEXT,
            updated_at     TEXT NOT NULL DEFAULT {now}
        );

        CREATE TABLE IF NOT EXISTS announcements (
            id            TEXT PRIMARY KEY,
            title         TEXT NOT NULL,
            content       TEXT NOT NULL,
            image_url     TEXT,
            is_published  INTEGER NOT NULL DEFAULT 0,
            published_at  TEXT NOT NULL DEFAULT {now},
            created_at    TEXT NOT NULL DEFAULT {now},
            created_by    TEXT
        );

        CREATE TABLE IF NOT EXISTS events (
            id            TEXT PRIMARY KEY,
            title         TEXT NOT NULL,
            description   TEXT,
            location      TEXT,
            start_time    TEXT NOT NULL,
            end_time      TEXT,
            capacity      INTEGER CHECK(capacity IS NULL OR capacity > 0),
            image_url     TEXT,
            is_published  INTEGER NOT NULL DEFAULT 0,
            created_at    TEXT NOT NULL DEFAULT {now}
        );

        CREATE TABLE IF NOT EXISTS contact_categories (
            id             TEXT PRIMARY KEY,
            name           TEXT NOT NULL,
            description    TEXT,
            contact_email  TEXT NOT NULL,
            display_order  INTEGER NOT NULL DEFAULT 0,
            is_active      INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS change_log (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            table_name  TEXT NOT NULL,
            kind        TEXT NOT NULL CHECK(kind IN ('INSERT','UPDATE','DELETE')),
            old_row     TEXT,
            new_row     TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_events_start ON events(start_time);
        CREATE INDEX IF NOT EXISTS idx_announcements_published ON announcements(published_at);
        ",
        now = NOW_TEXT
    ))?;

    for table in Table::all() {
        conn.execute_batch(&change_triggers(table))?;
    }

    seed_prayer_times(conn)?;
    Ok(())
}

/// `json_object(...)` over every column of `table`, reading from `NEW` or `OLD`.
fn row_image(table: Table, alias: &str) -> String {
    let fields: Vec<String> = table
        .columns()
        .iter()
        .map(|c| match c.kind {
            ColumnKind::Bool => format!(
                "'{name}', json(CASE WHEN {alias}.{name} THEN 'true' ELSE 'false' END)",
                name = c.name
            ),
            ColumnKind::Text | ColumnKind::Integer => {
                format!("'{name}', {alias}.{name}", name = c.name)
            }
        })
        .collect();
    format!("json_object({})", fields.join(", "))
}

fn change_triggers(table: Table) -> String {
    let name = table.name();
    let new_image = row_image(table, "NEW");
    let old_image = row_image(table, "OLD");
    format!(
        "
        CREATE TRIGGER IF NOT EXISTS {name}_log_insert AFTER INSERT ON {name} BEGIN
            INSERT INTO change_log (table_name, kind, old_row, new_row)
            VALUES ('{name}', 'INSERT', NULL, {new_image});
        END;

        CREATE TRIGGER IF NOT EXISTS {name}_log_update AFTER UPDATE ON {name} BEGIN
            INSERT INTO change_log (table_name, kind, old_row, new_row)
            VALUES ('{name}', 'UPDATE', {old_image}, {new_image});
        END;

        CREATE TRIGGER IF NOT EXISTS {name}_log_delete AFTER DELETE ON {name} BEGIN
            INSERT INTO change_log (table_name, kind, old_row, new_row)
            VALUES ('{name}', 'DELETE', {old_image}, NULL);
        END;
        "
    )
}

/// Default congregation times for a fresh database. Admins edit them afterwards.
fn seed_prayer_times(conn: &Connection) -> Result<()> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM prayer_times", [], |row| row.get(0))?;
    if existing > 0 {
        return Ok(());
    }

    let defaults = [
        (PrayerName::Fajr, Some("05:15"), "05:30"),
        (PrayerName::Dhuhr, Some("12:45"), "13:00"),
        (PrayerName::Asr, Some("16:15"), "16:30"),
        (PrayerName::Maghrib, None, "19:00"),
        (PrayerName::Isha, Some("20:15"), "20:30"),
        (PrayerName::Jummah, Some("12:45"), "13:15"),
    ];

    for (order, (name, adhan, iqama)) in defaults.iter().enumerate() {
        conn.execute(
            "INSERT INTO prayer_times (id, prayer_name, adhan_time, iqama_time, is_active, display_order)
             VALUES (?1, ?2, ?3, ?4, 1, ?5)",
            params![
                uuid::Uuid::new_v4().to_string(),
                name.display_name(),
                adhan,
                iqama,
                order as i64
            ],
        )?;
    }
    Ok(())
}
