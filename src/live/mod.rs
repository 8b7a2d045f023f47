//! Live caches over the data store.
//!
//! Each view owns its caches: an initial load, a standing change channel
//! that triggers reloads for relevant events, and manual refresh. Nothing
//! here is shared between views.

pub mod collection;
pub mod feed;
pub mod item;
pub mod subject;

pub use collection::{LiveCollection, LoadState};
pub use feed::{Audience, ContactFeed, EventFeed, Feed, NewsFeed, PrayerFeed};
pub use item::LiveItem;
pub use subject::{RefreshSubject, Subscription};
