use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::datastore::{ChangeEvent, ChangeKind, Filter, OrderBy, Table};
use crate::models::time::timestamp;
use crate::models::{ContactChannel, EventItem, NewsItem, PrayerSlot};

/// Who a collection is shown to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Audience {
    /// Only published / active rows.
    #[default]
    Public,
    /// Everything, drafts included.
    Admin,
}

/// User-facing text for a collection's failure modes.
#[derive(Debug, Clone, Copy)]
pub struct FeedMessages {
    pub load_failed: &'static str,
    pub item_failed: &'static str,
    pub not_found: &'static str,
    pub invalid_id: &'static str,
}

/// How one collection is queried and which change events concern it.
pub trait Feed: Clone + Send + Sync + 'static {
    type Item: DeserializeOwned + Clone;

    const TABLE: Table;
    const MESSAGES: FeedMessages;

    /// Audience filter, shared by list and single-item views.
    fn visibility(&self) -> Vec<Filter>;

    fn filters(&self, _now: DateTime<Utc>) -> Vec<Filter> {
        self.visibility()
    }

    fn order(&self) -> OrderBy;

    fn is_relevant(&self, event: &ChangeEvent) -> bool;
}

/// Deletes always matter; inserts and updates only when either image is visible.
pub fn touches_visible(event: &ChangeEvent, flag: &str) -> bool {
    event.kind == ChangeKind::Delete
        || event.new_flag(flag) == Some(true)
        || event.old_flag(flag) == Some(true)
}

fn flag_filter(audience: Audience, flag: &'static str) -> Vec<Filter> {
    match audience {
        Audience::Public => vec![Filter::eq(flag, true)],
        Audience::Admin => Vec::new(),
    }
}

fn relevant_for(audience: Audience, event: &ChangeEvent, flag: &str) -> bool {
    match audience {
        Audience::Public => touches_visible(event, flag),
        Audience::Admin => true,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PrayerFeed {
    pub audience: Audience,
}

impl Feed for PrayerFeed {
    type Item = PrayerSlot;

    const TABLE: Table = Table::PrayerTimes;
    const MESSAGES: FeedMessages = FeedMessages {
        load_failed: "Unable to load prayer times. Please try again.",
        item_failed: "Unable to load prayer time. Please try again.",
        not_found: "This prayer time is no longer available.",
        invalid_id: "Invalid prayer time ID",
    };

    fn visibility(&self) -> Vec<Filter> {
        flag_filter(self.audience, "is_active")
    }

    fn order(&self) -> OrderBy {
        OrderBy::asc("display_order")
    }

    fn is_relevant(&self, event: &ChangeEvent) -> bool {
        relevant_for(self.audience, event, "is_active")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NewsFeed {
    pub audience: Audience,
}

impl Feed for NewsFeed {
    type Item = NewsItem;

    const TABLE: Table = Table::Announcements;
    const MESSAGES: FeedMessages = FeedMessages {
        load_failed: "Unable to load announcements. Please try again.",
        item_failed: "Unable to load announcement. Please try again.",
        not_found: "This announcement is no longer available.",
        invalid_id: "Invalid announcement ID",
    };

    fn visibility(&self) -> Vec<Filter> {
        flag_filter(self.audience, "is_published")
    }

    fn order(&self) -> OrderBy {
        OrderBy::desc("published_at")
    }

    fn is_relevant(&self, event: &ChangeEvent) -> bool {
        relevant_for(self.audience, event, "is_published")
    }
}

/// Upcoming events only, for every audience.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventFeed {
    pub audience: Audience,
}

impl Feed for EventFeed {
    type Item = EventItem;

    const TABLE: Table = Table::Events;
    const MESSAGES: FeedMessages = FeedMessages {
        load_failed: "Unable to load events. Please try again.",
        item_failed: "Unable to load event. Please try again.",
        not_found: "Event not found",
        invalid_id: "Event ID is required",
    };

    fn visibility(&self) -> Vec<Filter> {
        flag_filter(self.audience, "is_published")
    }

    fn filters(&self, now: DateTime<Utc>) -> Vec<Filter> {
        let mut filters = self.visibility();
        filters.push(Filter::gte("start_time", timestamp::format(&now)));
        filters
    }

    fn order(&self) -> OrderBy {
        OrderBy::asc("start_time")
    }

    fn is_relevant(&self, event: &ChangeEvent) -> bool {
        relevant_for(self.audience, event, "is_published")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContactFeed {
    pub audience: Audience,
}

impl Feed for ContactFeed {
    type Item = ContactChannel;

    const TABLE: Table = Table::ContactCategories;
    const MESSAGES: FeedMessages = FeedMessages {
        load_failed: "Unable to load contact information. Please try again.",
        item_failed: "Unable to load contact information. Please try again.",
        not_found: "This contact is no longer available.",
        invalid_id: "Invalid contact ID",
    };

    fn visibility(&self) -> Vec<Filter> {
        flag_filter(self.audience, "is_active")
    }

    fn order(&self) -> OrderBy {
        OrderBy::asc("display_order")
    }

    fn is_relevant(&self, event: &ChangeEvent) -> bool {
        relevant_for(self.audience, event, "is_active")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::Row;
    use serde_json::json;

    fn image(published: bool) -> Option<Row> {
        json!({"id": "n1", "is_published": published}).as_object().cloned()
    }

    fn change(kind: ChangeKind, old: Option<Row>, new: Option<Row>) -> ChangeEvent {
        ChangeEvent {
            table: Table::Announcements,
            kind,
            old,
            new,
        }
    }

    #[test]
    fn public_news_ignores_hidden_rows() {
        let feed = NewsFeed::default();
        assert!(!feed.is_relevant(&change(ChangeKind::Insert, None, image(false))));
        assert!(!feed.is_relevant(&change(ChangeKind::Update, image(false), image(false))));
        assert!(feed.is_relevant(&change(ChangeKind::Update, image(false), image(true))));
        assert!(feed.is_relevant(&change(ChangeKind::Update, image(true), image(false))));
        assert!(feed.is_relevant(&change(ChangeKind::Delete, image(false), None)));
    }

    #[test]
    fn admin_sees_every_change() {
        let feed = NewsFeed {
            audience: Audience::Admin,
        };
        assert!(feed.is_relevant(&change(ChangeKind::Update, image(false), image(false))));
        assert!(feed.visibility().is_empty());
    }

    #[test]
    fn events_bound_by_start_time() {
        let now = chrono::TimeZone::with_ymd_and_hms(&Utc, 2026, 5, 1, 8, 0, 0).unwrap();
        let filters = EventFeed::default().filters(now);
        assert_eq!(
            filters,
            vec![
                Filter::eq("is_published", true),
                Filter::gte("start_time", "2026-05-01T08:00:00Z"),
            ]
        );
    }
}
