use chrono::{Datelike, NaiveDateTime, Weekday};

use crate::models::time::{MINUTES_PER_DAY, minutes_since_midnight};
use crate::models::{PrayerName, PrayerSlot};

/// The one prayer that only happens on one day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyRule {
    pub prayer: PrayerName,
    pub weekday: Weekday,
}

impl Default for WeeklyRule {
    fn default() -> Self {
        Self {
            prayer: PrayerName::Jummah,
            weekday: Weekday::Fri,
        }
    }
}

impl WeeklyRule {
    pub fn is_eligible(&self, name: PrayerName, today: Weekday) -> bool {
        name != self.prayer || today == self.weekday
    }
}

/// Picks the next congregation among `slots` at `now`.
///
/// `slots` is in display order, not clock order. The first eligible slot later
/// than the current minute wins; when every slot has passed the first eligible
/// one is returned (tomorrow's first prayer). `None` only when nothing is
/// eligible at all.
pub fn next_slot<'a>(
    slots: &'a [PrayerSlot],
    now: NaiveDateTime,
    rule: &WeeklyRule,
) -> Option<&'a PrayerSlot> {
    let today = now.weekday();
    let now_minutes = minutes_since_midnight(&now);

    let mut eligible = slots
        .iter()
        .filter(|slot| slot.active && rule.is_eligible(slot.name, today));

    let first = eligible.next()?;
    if first.congregation_time.minutes() > now_minutes {
        return Some(first);
    }
    Some(
        eligible
            .find(|slot| slot.congregation_time.minutes() > now_minutes)
            .unwrap_or(first),
    )
}

/// Whole minutes from `now` until `slot`, wrapping past midnight.
pub fn minutes_until(slot: &PrayerSlot, now: NaiveDateTime) -> u32 {
    let now_minutes = minutes_since_midnight(&now);
    let target = slot.congregation_time.minutes();
    if target > now_minutes {
        target - now_minutes
    } else {
        MINUTES_PER_DAY - now_minutes + target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn slot(name: PrayerName, time: &str, order: i64) -> PrayerSlot {
        PrayerSlot {
            id: format!("{}-{}", name.display_name().to_lowercase(), order),
            name,
            call_time: None,
            congregation_time: time.parse().unwrap(),
            active: true,
            sort_order: order,
            note: None,
            updated_at: Utc::now(),
        }
    }

    fn daily() -> Vec<PrayerSlot> {
        vec![
            slot(PrayerName::Fajr, "05:30", 0),
            slot(PrayerName::Dhuhr, "13:00", 1),
            slot(PrayerName::Asr, "16:30", 2),
            slot(PrayerName::Maghrib, "19:00", 3),
            slot(PrayerName::Isha, "20:30", 4),
        ]
    }

    // 2026-03-04 is a Wednesday, 2026-03-06 a Friday
    fn wednesday(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 4).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    fn friday(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 6).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    fn name_of(found: Option<&PrayerSlot>) -> Option<PrayerName> {
        found.map(|s| s.name)
    }

    #[test]
    fn picks_first_later_slot() {
        let slots = daily();
        let found = next_slot(&slots, wednesday(14, 0), &WeeklyRule::default());
        assert_eq!(name_of(found), Some(PrayerName::Asr));
    }

    #[test]
    fn wraps_to_first_slot_after_isha() {
        let slots = daily();
        let found = next_slot(&slots, wednesday(23, 0), &WeeklyRule::default());
        assert_eq!(name_of(found), Some(PrayerName::Fajr));
    }

    #[test]
    fn slot_at_current_minute_counts_as_passed() {
        let slots = daily();
        let found = next_slot(&slots, wednesday(13, 0), &WeeklyRule::default());
        assert_eq!(name_of(found), Some(PrayerName::Asr));
    }

    #[test]
    fn seconds_do_not_round_up() {
        let slots = daily();
        let now = NaiveDate::from_ymd_opt(2026, 3, 4)
            .unwrap()
            .and_hms_opt(12, 59, 59)
            .unwrap();
        let found = next_slot(&slots, now, &WeeklyRule::default());
        assert_eq!(name_of(found), Some(PrayerName::Dhuhr));
    }

    #[test]
    fn weekly_slot_skipped_on_other_days() {
        let mut slots = daily();
        slots.insert(2, slot(PrayerName::Jummah, "13:15", 5));
        for h in 0..24 {
            let found = next_slot(&slots, wednesday(h, 0), &WeeklyRule::default());
            assert_ne!(name_of(found), Some(PrayerName::Jummah));
        }
        let found = next_slot(&slots, wednesday(12, 0), &WeeklyRule::default());
        assert_eq!(name_of(found), Some(PrayerName::Dhuhr));
    }

    #[test]
    fn weekly_slot_competes_by_time_on_its_day() {
        // Dhuhr listed before Jummah and earlier, so it still wins at 12:00
        let mut slots = daily();
        slots.insert(2, slot(PrayerName::Jummah, "13:15", 5));
        let found = next_slot(&slots, friday(12, 0), &WeeklyRule::default());
        assert_eq!(name_of(found), Some(PrayerName::Dhuhr));

        let found = next_slot(&slots, friday(13, 5), &WeeklyRule::default());
        assert_eq!(name_of(found), Some(PrayerName::Jummah));
    }

    #[test]
    fn input_order_decides_not_clock_order() {
        // Jummah listed first even though it is later than Dhuhr
        let slots = vec![
            slot(PrayerName::Jummah, "13:15", 0),
            slot(PrayerName::Dhuhr, "13:00", 1),
        ];
        let found = next_slot(&slots, friday(12, 0), &WeeklyRule::default());
        assert_eq!(name_of(found), Some(PrayerName::Jummah));
    }

    #[test]
    fn nothing_active_yields_none() {
        let mut slots = daily();
        for s in &mut slots {
            s.active = false;
        }
        assert!(next_slot(&slots, wednesday(10, 0), &WeeklyRule::default()).is_none());
        assert!(next_slot(&[], wednesday(10, 0), &WeeklyRule::default()).is_none());
    }

    #[test]
    fn only_weekly_slot_off_day_yields_none() {
        let slots = vec![slot(PrayerName::Jummah, "13:15", 0)];
        assert!(next_slot(&slots, wednesday(10, 0), &WeeklyRule::default()).is_none());
        // On its day it wraps to itself rather than disappearing
        let found = next_slot(&slots, friday(20, 0), &WeeklyRule::default());
        assert_eq!(name_of(found), Some(PrayerName::Jummah));
    }

    #[test]
    fn custom_weekday_rule() {
        let mut slots = daily();
        slots.push(slot(PrayerName::Jummah, "21:00", 5));
        let rule = WeeklyRule {
            prayer: PrayerName::Jummah,
            weekday: Weekday::Wed,
        };
        let found = next_slot(&slots, wednesday(20, 45), &rule);
        assert_eq!(name_of(found), Some(PrayerName::Jummah));
    }

    #[test]
    fn countdown_wraps_midnight() {
        let slots = daily();
        assert_eq!(minutes_until(&slots[2], wednesday(14, 0)), 150);
        assert_eq!(minutes_until(&slots[0], wednesday(23, 0)), 60 + 330);
    }
}
