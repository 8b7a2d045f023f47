//! The data store seam: tables, filters, change notifications and the
//! `DataStore` trait every backend implements.
//!
//! Rows travel as JSON objects keyed by column name so the same trait can
//! serve SQLite and the in-memory fake used in tests. Typed access goes
//! through [`decode_rows`].

#[cfg(test)]
pub mod memory;
pub mod registry;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn text(name: &'static str) -> Column {
    Column { name, kind: ColumnKind::Text }
}

const fn integer(name: &'static str) -> Column {
    Column { name, kind: ColumnKind::Integer }
}

const fn flag(name: &'static str) -> Column {
    Column { name, kind: ColumnKind::Bool }
}

const PRAYER_TIMES: &[Column] = &[
    text("id"),
    text("prayer_name"),
    text("adhan_time"),
    text("iqama_time"),
    flag("is_active"),
    integer("display_order"),
    text("notes"),
    text("updated_at"),
];

const ANNOUNCEMENTS: &[Column] = &[
    text("id"),
    text("title"),
    text("content"),
    text("image_url"),
    flag("is_published"),
    text("published_at"),
    text("created_at"),
    text("created_by"),
];

const EVENTS: &[Column] = &[
    text("id"),
    text("title"),
    text("description"),
    text("location"),
    text("start_time"),
    text("end_time"),
    integer("capacity"),
    text("image_url"),
    flag("is_published"),
    text("created_at"),
];

const CONTACT_CATEGORIES: &[Column] = &[
    text("id"),
    text("name"),
    text("description"),
    text("contact_email"),
    integer("display_order"),
    flag("is_active"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    PrayerTimes,
    Announcements,
    Events,
    ContactCategories,
}

impl Table {
    pub fn all() -> [Table; 4] {
        [
            Table::PrayerTimes,
            Table::Announcements,
            Table::Events,
            Table::ContactCategories,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Table::PrayerTimes => "prayer_times",
            Table::Announcements => "announcements",
            Table::Events => "events",
            Table::ContactCategories => "contact_categories",
        }
    }

    pub fn columns(&self) -> &'static [Column] {
        match self {
            Table::PrayerTimes => PRAYER_TIMES,
            Table::Announcements => ANNOUNCEMENTS,
            Table::Events => EVENTS,
            Table::ContactCategories => CONTACT_CATEGORIES,
        }
    }

    pub fn column(&self, name: &str) -> Result<&'static Column, StoreError> {
        self.columns()
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| StoreError::UnknownColumn(name.to_string(), self.name()))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::all()
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| StoreError::UnknownTable(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(&'static str, Value),
    Gte(&'static str, Value),
}

impl Filter {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Filter::Eq(column, value.into())
    }

    pub fn gte(column: &'static str, value: impl Into<Value>) -> Self {
        Filter::Gte(column, value.into())
    }

    pub fn column(&self) -> &'static str {
        match self {
            Filter::Eq(c, _) | Filter::Gte(c, _) => c,
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            Filter::Eq(_, v) | Filter::Gte(_, v) => v,
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        let Some(actual) = row.get(self.column()) else {
            return false;
        };
        match self {
            Filter::Eq(_, expected) => actual == expected,
            Filter::Gte(_, bound) => {
                matches!(compare_values(actual, bound), Some(Ordering::Greater | Ordering::Equal))
            }
        }
    }
}

/// Orders two JSON scalars of the same kind; `None` when not comparable.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub ascending: bool,
}

impl OrderBy {
    pub fn asc(column: &'static str) -> Self {
        Self { column, ascending: true }
    }

    pub fn desc(column: &'static str) -> Self {
        Self { column, ascending: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "INSERT",
            ChangeKind::Update => "UPDATE",
            ChangeKind::Delete => "DELETE",
        }
    }
}

impl FromStr for ChangeKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSERT" => Ok(ChangeKind::Insert),
            "UPDATE" => Ok(ChangeKind::Update),
            "DELETE" => Ok(ChangeKind::Delete),
            other => Err(StoreError::Unavailable(format!("unknown change kind '{}'", other))),
        }
    }
}

/// A push notification describing one row change.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
    pub old: Option<Row>,
    pub new: Option<Row>,
}

impl ChangeEvent {
    pub fn row_id(&self) -> Option<&str> {
        self.new
            .as_ref()
            .or(self.old.as_ref())
            .and_then(|row| row.get("id"))
            .and_then(Value::as_str)
    }

    pub fn new_flag(&self, column: &str) -> Option<bool> {
        self.new.as_ref()?.get(column)?.as_bool()
    }

    pub fn old_flag(&self, column: &str) -> Option<bool> {
        self.old.as_ref()?.get(column)?.as_bool()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelHandle(pub u64);

pub type ChangeCallback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no matching row")]
    NotFound,
    #[error("unknown table '{0}'")]
    UnknownTable(String),
    #[error("unknown column '{0}' on {1}")]
    UnknownColumn(String, &'static str),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("malformed row: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The external data store. Reads, writes and a change feed.
///
/// Implementations must be shareable across the UI loop and the thread
/// that delivers notifications.
pub trait DataStore: Send + Sync {
    fn query(
        &self,
        table: Table,
        filters: &[Filter],
        order: Option<OrderBy>,
    ) -> Result<Vec<Row>, StoreError>;

    /// Inserts a row and returns its id. A missing `id` is generated.
    fn insert(&self, table: Table, row: Row) -> Result<String, StoreError>;

    fn update(&self, table: Table, id: &str, patch: Row) -> Result<(), StoreError>;

    fn delete(&self, table: Table, id: &str) -> Result<(), StoreError>;

    /// Registers `callback` for changes on `table`, optionally narrowed to one row id.
    fn subscribe_changes(
        &self,
        table: Table,
        row_id: Option<&str>,
        callback: ChangeCallback,
    ) -> ChannelHandle;

    fn unsubscribe(&self, handle: ChannelHandle);
}

pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(Value::Object(row)).map_err(StoreError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn filters_match_rows() {
        let r = row(json!({"is_published": true, "start_time": "2026-05-01T10:00:00Z"}));
        assert!(Filter::eq("is_published", true).matches(&r));
        assert!(!Filter::eq("is_published", false).matches(&r));
        assert!(Filter::gte("start_time", "2026-05-01T10:00:00Z").matches(&r));
        assert!(!Filter::gte("start_time", "2026-05-02T00:00:00Z").matches(&r));
        assert!(!Filter::eq("missing", true).matches(&r));
    }

    #[test]
    fn change_event_reads_id_from_either_image() {
        let deleted = ChangeEvent {
            table: Table::Events,
            kind: ChangeKind::Delete,
            old: Some(row(json!({"id": "e1", "is_published": true}))),
            new: None,
        };
        assert_eq!(deleted.row_id(), Some("e1"));
        assert_eq!(deleted.old_flag("is_published"), Some(true));
        assert_eq!(deleted.new_flag("is_published"), None);
    }

    #[test]
    fn unknown_column_is_rejected() {
        assert!(Table::Announcements.column("title").is_ok());
        assert!(matches!(
            Table::Announcements.column("capacity"),
            Err(StoreError::UnknownColumn(_, "announcements"))
        ));
    }

    #[test]
    fn table_names_round_trip() {
        for table in Table::all() {
            assert_eq!(table.name().parse::<Table>().unwrap(), table);
        }
    }
}
