use chrono::{DateTime, Utc};
use log::info;
use serde_json::Value;
use thiserror::Error;

use super::forms::{ContactForm, EventForm, NewsForm, SlotPatch, ValidationError};
use crate::datastore::{DataStore, Filter, OrderBy, Row, StoreError, Table, decode_rows};
use crate::models::time::timestamp;
use crate::models::{ContactChannel, EventItem, NewsItem, PrayerName, PrayerSlot};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Unable to save changes: {0}")]
    Write(#[from] StoreError),
}

pub type AdminResult<T> = Result<T, AdminError>;

fn find_by_id<T: serde::de::DeserializeOwned>(
    store: &dyn DataStore,
    table: Table,
    id: &str,
) -> AdminResult<T> {
    let rows = store.query(table, &[Filter::eq("id", id)], None)?;
    decode_rows::<T>(rows)?
        .into_iter()
        .next()
        .ok_or(AdminError::Write(StoreError::NotFound))
}

fn stamp(now: DateTime<Utc>) -> Value {
    Value::String(timestamp::format(&now))
}

// ─── Announcements ───────────────────────────────────────────────────────────

pub fn find_announcement(store: &dyn DataStore, id: &str) -> AdminResult<NewsItem> {
    find_by_id(store, Table::Announcements, id)
}

/// Creates an unpublished announcement and returns its id.
pub fn create_announcement(
    store: &dyn DataStore,
    form: &NewsForm,
    now: DateTime<Utc>,
) -> AdminResult<String> {
    let mut row = form.validate()?;
    row.insert("is_published".into(), false.into());
    row.insert("published_at".into(), stamp(now));
    row.insert("created_at".into(), stamp(now));
    row.insert("created_by".into(), Value::Null);
    let id = store.insert(Table::Announcements, row)?;
    info!("Created announcement {}", id);
    Ok(id)
}

pub fn update_announcement(store: &dyn DataStore, id: &str, form: &NewsForm) -> AdminResult<()> {
    let row = form.validate()?;
    store.update(Table::Announcements, id, row)?;
    Ok(())
}

/// Publishing re-stamps `published_at` so the item sorts to the top.
pub fn set_announcement_published(
    store: &dyn DataStore,
    id: &str,
    published: bool,
    now: DateTime<Utc>,
) -> AdminResult<()> {
    let mut patch = Row::new();
    patch.insert("is_published".into(), published.into());
    if published {
        patch.insert("published_at".into(), stamp(now));
    }
    store.update(Table::Announcements, id, patch)?;
    Ok(())
}

pub fn delete_announcement(store: &dyn DataStore, id: &str) -> AdminResult<()> {
    store.delete(Table::Announcements, id)?;
    info!("Deleted announcement {}", id);
    Ok(())
}

// ─── Events ──────────────────────────────────────────────────────────────────

pub fn find_event(store: &dyn DataStore, id: &str) -> AdminResult<EventItem> {
    find_by_id(store, Table::Events, id)
}

pub fn create_event(
    store: &dyn DataStore,
    form: &EventForm,
    now: DateTime<Utc>,
) -> AdminResult<String> {
    let mut row = form.validate()?;
    row.insert("is_published".into(), false.into());
    row.insert("created_at".into(), stamp(now));
    let id = store.insert(Table::Events, row)?;
    info!("Created event {}", id);
    Ok(id)
}

pub fn update_event(store: &dyn DataStore, id: &str, form: &EventForm) -> AdminResult<()> {
    let row = form.validate()?;
    store.update(Table::Events, id, row)?;
    Ok(())
}

pub fn set_event_published(store: &dyn DataStore, id: &str, published: bool) -> AdminResult<()> {
    let mut patch = Row::new();
    patch.insert("is_published".into(), published.into());
    store.update(Table::Events, id, patch)?;
    Ok(())
}

pub fn delete_event(store: &dyn DataStore, id: &str) -> AdminResult<()> {
    store.delete(Table::Events, id)?;
    info!("Deleted event {}", id);
    Ok(())
}

// ─── Prayer slots ────────────────────────────────────────────────────────────

/// Applies `patch` to the slot named `name`. Returns `false` for an empty patch.
pub fn update_prayer_slot(
    store: &dyn DataStore,
    name: PrayerName,
    patch: &SlotPatch,
) -> AdminResult<bool> {
    let row = patch.validate()?;
    if row.is_empty() {
        return Ok(false);
    }

    let rows = store.query(
        Table::PrayerTimes,
        &[Filter::eq("prayer_name", name.display_name())],
        None,
    )?;
    let slot = decode_rows::<PrayerSlot>(rows)?
        .into_iter()
        .next()
        .ok_or(AdminError::Write(StoreError::NotFound))?;

    store.update(Table::PrayerTimes, &slot.id, row)?;
    info!("Updated {} slot", name);
    Ok(true)
}

// ─── Contact channels ────────────────────────────────────────────────────────

/// Adds an active channel, appended after the existing ones unless an order is given.
pub fn add_contact(store: &dyn DataStore, form: &ContactForm) -> AdminResult<String> {
    let mut row = form.validate()?;
    if !row.contains_key("display_order") {
        let existing = store.query(
            Table::ContactCategories,
            &[],
            Some(OrderBy::desc("display_order")),
        )?;
        let next = decode_rows::<ContactChannel>(existing)?
            .first()
            .map_or(0, |c| c.display_order + 1);
        row.insert("display_order".into(), next.into());
    }
    row.insert("is_active".into(), true.into());
    Ok(store.insert(Table::ContactCategories, row)?)
}

pub fn remove_contact(store: &dyn DataStore, id: &str) -> AdminResult<()> {
    store.delete(Table::ContactCategories, id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::memory::MemoryStore;
    use crate::live::{LiveCollection, NewsFeed};
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn news_form(title: &str) -> NewsForm {
        NewsForm {
            title: title.into(),
            content: "Details".into(),
            image_url: String::new(),
        }
    }

    #[test]
    fn new_announcement_is_a_draft_until_published() {
        let store = MemoryStore::new();
        let id = create_announcement(&store, &news_form("Eid"), now()).unwrap();

        let mut public = LiveCollection::new(NewsFeed::default());
        public.load(&store);
        assert!(public.items().is_empty());

        let later = now() + chrono::Duration::hours(2);
        set_announcement_published(&store, &id, true, later).unwrap();
        public.load(&store);
        assert_eq!(public.items().len(), 1);
        assert_eq!(public.items()[0].published_at, later);
    }

    #[test]
    fn validation_blocks_the_write() {
        let store = MemoryStore::new();
        let err = create_announcement(&store, &news_form(""), now()).unwrap_err();
        assert!(matches!(err, AdminError::Validation(ValidationError::TitleRequired)));
        assert_eq!(err.to_string(), "Title is required");
    }

    #[test]
    fn edit_keeps_publication_state() {
        let store = MemoryStore::new();
        let id = create_announcement(&store, &news_form("Eid"), now()).unwrap();
        set_announcement_published(&store, &id, true, now()).unwrap();

        let mut form = NewsForm::from_item(&find_announcement(&store, &id).unwrap());
        form.title = "Eid al-Fitr".into();
        update_announcement(&store, &id, &form).unwrap();

        let item = find_announcement(&store, &id).unwrap();
        assert_eq!(item.title, "Eid al-Fitr");
        assert!(item.is_published);
    }

    #[test]
    fn missing_rows_surface_as_write_errors() {
        let store = MemoryStore::new();
        assert!(matches!(
            delete_event(&store, "nope"),
            Err(AdminError::Write(StoreError::NotFound))
        ));
        assert!(matches!(
            find_announcement(&store, "nope"),
            Err(AdminError::Write(StoreError::NotFound))
        ));
    }

    #[test]
    fn event_created_unpublished() {
        let store = MemoryStore::new();
        let form = EventForm {
            title: "Quran Circle".into(),
            start_date: "2999-01-01".into(),
            start_time: "19:00".into(),
            capacity: "25".into(),
            ..Default::default()
        };
        let id = create_event(&store, &form, now()).unwrap();
        let event = find_event(&store, &id).unwrap();
        assert!(!event.is_published);
        assert_eq!(event.capacity_label().as_deref(), Some("25 spots available"));

        set_event_published(&store, &id, true).unwrap();
        assert!(find_event(&store, &id).unwrap().is_published);
    }

    #[test]
    fn slot_update_by_name() {
        let store = MemoryStore::new();
        store.seed(
            Table::PrayerTimes,
            json!({
                "id": "s-dhuhr",
                "prayer_name": "Dhuhr",
                "adhan_time": "12:45",
                "iqama_time": "13:00",
                "is_active": true,
                "display_order": 1,
                "notes": null,
                "updated_at": "2026-01-01T00:00:00Z",
            }),
        );

        assert!(!update_prayer_slot(&store, PrayerName::Dhuhr, &SlotPatch::default()).unwrap());
        assert_eq!(store.query_count(), 0);

        let patch = SlotPatch {
            iqama: Some("13:30".into()),
            note: Some("Summer schedule".into()),
            ..Default::default()
        };
        assert!(update_prayer_slot(&store, PrayerName::Dhuhr, &patch).unwrap());

        let rows = store.query(Table::PrayerTimes, &[], None).unwrap();
        let slot: PrayerSlot = decode_rows(rows).unwrap().remove(0);
        assert_eq!(slot.congregation_time.to_string(), "13:30");
        assert_eq!(slot.note.as_deref(), Some("Summer schedule"));

        assert!(matches!(
            update_prayer_slot(&store, PrayerName::Isha, &patch),
            Err(AdminError::Write(StoreError::NotFound))
        ));
    }

    #[test]
    fn contacts_append_in_order() {
        let store = MemoryStore::new();
        let form = |name: &str| ContactForm {
            name: name.into(),
            email: "office@example.org".into(),
            ..Default::default()
        };
        add_contact(&store, &form("General")).unwrap();
        let second = add_contact(&store, &form("Nikah")).unwrap();

        let rows = store
            .query(Table::ContactCategories, &[Filter::eq("id", second.clone())], None)
            .unwrap();
        let channel: ContactChannel = decode_rows(rows).unwrap().remove(0);
        assert_eq!(channel.display_order, 1);
        assert!(channel.is_active);

        remove_contact(&store, &second).unwrap();
        assert_eq!(store.query(Table::ContactCategories, &[], None).unwrap().len(), 1);
    }
}
