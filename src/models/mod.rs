pub mod contact;
pub mod event;
pub mod news;
pub mod prayer;
pub mod time;

pub use contact::ContactChannel;
pub use event::EventItem;
pub use news::NewsItem;
pub use prayer::{PrayerName, PrayerSlot};
pub use time::TimeOfDay;
