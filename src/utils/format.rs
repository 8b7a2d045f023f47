use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use unicode_width::UnicodeWidthChar;

use crate::models::TimeOfDay;

/// Format a countdown in minutes as "Xh Ym" or "Ym"
pub fn format_duration_minutes(minutes: u32) -> String {
    if minutes == 0 {
        return "now".to_string();
    }
    let hours = minutes / 60;
    let rest = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, rest)
    } else {
        format!("{}m", rest)
    }
}

/// "13:30" -> "1:30 PM"
pub fn format_time_12h(t: TimeOfDay) -> String {
    let period = if t.hour() >= 12 { "PM" } else { "AM" };
    let hour = match t.hour() % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", hour, t.minute(), period)
}

pub fn format_clock(t: TimeOfDay, twelve_hour: bool) -> String {
    if twelve_hour {
        format_time_12h(t)
    } else {
        t.to_string()
    }
}

/// Announcement age: relative for the last week, a calendar date after that.
pub fn format_relative<Tz: TimeZone>(ts: DateTime<Utc>, now: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let elapsed = now.with_timezone(&Utc) - ts;
    let days = elapsed.num_days();

    if days < 1 {
        let hours = elapsed.num_hours();
        if hours < 1 {
            let minutes = elapsed.num_minutes();
            return if minutes <= 1 {
                "Just now".to_string()
            } else {
                format!("{} minutes ago", minutes)
            };
        }
        return if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        };
    }

    if days < 7 {
        return if days == 1 {
            "1 day ago".to_string()
        } else {
            format!("{} days ago", days)
        };
    }

    let local = ts.with_timezone(&now.timezone());
    if local.year() == now.year() {
        local.format("%b %-d").to_string()
    } else {
        local.format("%b %-d, %Y").to_string()
    }
}

/// Event schedule line, e.g. "Sat, Mar 7 · 6:30 PM – 8:00 PM".
pub fn format_event_range(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    twelve_hour: bool,
) -> String {
    let start = start.with_timezone(&Local);
    let time_fmt = if twelve_hour { "%-I:%M %p" } else { "%H:%M" };
    let mut out = format!("{} · {}", start.format("%a, %b %-d"), start.format(time_fmt));
    if let Some(end) = end {
        let end = end.with_timezone(&Local);
        if end.date_naive() == start.date_naive() {
            out.push_str(&format!(" – {}", end.format(time_fmt)));
        } else {
            out.push_str(&format!(" – {} {}", end.format("%a, %b %-d"), end.format(time_fmt)));
        }
    }
    out
}

/// Keep the first `max_width` terminal columns of `text`, adding "..." when cut.
pub fn truncate_text(text: &str, max_width: usize) -> String {
    let text = text.trim();
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max_width {
        return text.to_string();
    }

    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width {
            break;
        }
        used += w;
        out.push(c);
    }
    format!("{}...", out.trim_end())
}
