use chrono::NaiveDateTime;

use super::resolver::{WeeklyRule, minutes_until, next_slot};
use crate::datastore::DataStore;
use crate::live::{LiveCollection, PrayerFeed, RefreshSubject};
use crate::models::PrayerSlot;

/// Prayer slots plus the derived "next prayer".
///
/// The derived value is recomputed after every applied load and on every
/// tick; the board never schedules anything itself.
pub struct PrayerBoard {
    slots: LiveCollection<PrayerFeed>,
    rule: WeeklyRule,
    next: Option<PrayerSlot>,
    countdown: Option<u32>,
}

impl PrayerBoard {
    pub fn new(feed: PrayerFeed, rule: WeeklyRule) -> Self {
        Self {
            slots: LiveCollection::new(feed),
            rule,
            next: None,
            countdown: None,
        }
    }

    pub fn slots(&self) -> &LiveCollection<PrayerFeed> {
        &self.slots
    }

    pub fn next(&self) -> Option<&PrayerSlot> {
        self.next.as_ref()
    }

    /// Minutes until the next congregation, as of the last recompute.
    pub fn countdown(&self) -> Option<u32> {
        self.countdown
    }

    pub fn load(&mut self, store: &dyn DataStore, now: NaiveDateTime) {
        if self.slots.load(store) {
            self.recompute(now);
        }
    }

    pub fn tick(&mut self, now: NaiveDateTime) {
        self.recompute(now);
    }

    pub fn subject(&self, on_refresh: impl Fn() + Send + Sync + 'static) -> RefreshSubject {
        self.slots.subject(on_refresh)
    }

    fn recompute(&mut self, now: NaiveDateTime) {
        let next = next_slot(self.slots.items(), now, &self.rule);
        self.countdown = next.map(|slot| minutes_until(slot, now));
        self.next = next.cloned();
    }
}
