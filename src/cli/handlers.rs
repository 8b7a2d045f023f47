use anyhow::Result;
use chrono::{Local, Utc};

use super::{AMBER, BOLD, DIM, GOLD, GREEN, RED};
use crate::config::AppConfig;
use crate::datastore::DataStore;
use crate::live::{
    Audience, ContactFeed, EventFeed, Feed, LiveCollection, LiveItem, LoadState, NewsFeed,
    PrayerFeed,
};
use crate::models::{EventItem, NewsItem};
use crate::prayer_times::PrayerBoard;
use crate::utils::format::{
    format_clock, format_duration_minutes, format_event_range, format_relative, truncate_text,
};

fn audience(all: bool) -> Audience {
    if all { Audience::Admin } else { Audience::Public }
}

/// Prints a collection's error, if any. Returns `true` when there is nothing else to show.
fn report_load<F: Feed>(col: &LiveCollection<F>, empty: &str) -> bool {
    if let Some(err) = col.error() {
        println_colored!(RED, "  {}", err);
        println!();
        return true;
    }
    if col.items().is_empty() {
        println_colored!(DIM, "  {}", empty);
        println!();
        return true;
    }
    false
}

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times(store: &dyn DataStore, config: &AppConfig) -> Result<()> {
    let now = Local::now();
    let mut board = PrayerBoard::new(PrayerFeed::default(), config.weekly_rule()?);
    board.load(store, now.naive_local());

    println!();
    println_colored!(
        GOLD,
        "  Congregation Times · {} ({})",
        config.display.organization_name,
        now.format("%A, %b %-d")
    );
    println!();

    if report_load(board.slots(), "Prayer times have not been set yet.") {
        return Ok(());
    }

    let twelve = config.display.twelve_hour;
    println_colored!(DIM, "  {:<10}  {:>9}  {:>9}", "Prayer", "Adhan", "Iqama");
    for slot in board.slots().items() {
        let adhan = slot
            .call_time
            .map(|t| format_clock(t, twelve))
            .unwrap_or_else(|| "—".to_string());
        let iqama = format_clock(slot.congregation_time, twelve);
        let is_next = board.next().is_some_and(|n| n.id == slot.id);
        let line = format!("  {:<10}  {:>9}  {:>9}", slot.name.display_name(), adhan, iqama);
        if is_next {
            println_colored!(BOLD, "{}  ◀", line);
        } else {
            println!("{}", line);
        }
        if let Some(note) = &slot.note {
            println_colored!(DIM, "  {:<10}  {}", "", note);
        }
    }

    if let (Some(next), Some(minutes)) = (board.next(), board.countdown()) {
        println!();
        println_colored!(
            AMBER,
            "  Next: {} in {}",
            next.name.display_name(),
            format_duration_minutes(minutes)
        );
    }
    println!();
    Ok(())
}

// ─── Announcements ───────────────────────────────────────────────────────────

pub fn handle_news(store: &dyn DataStore, all: bool, id: Option<&str>) -> Result<()> {
    let feed = NewsFeed {
        audience: audience(all),
    };
    if let Some(id) = id {
        let mut view = LiveItem::new(feed, id);
        view.load(store);
        return print_item(&view, print_news_detail);
    }

    let mut col = LiveCollection::new(feed);
    col.load(store);

    println!();
    println_colored!(GOLD, "  Announcements");
    println!();
    if report_load(&col, "No announcements right now.") {
        return Ok(());
    }

    let now = Utc::now().with_timezone(&Local);
    for item in col.items() {
        let draft = if item.is_published { "" } else { " [draft]" };
        println_colored!(BOLD, "  {}{}", item.title, draft);
        println_colored!(
            DIM,
            "  {} · {}",
            format_relative(item.published_at, now),
            item.id
        );
        println!("  {}", truncate_text(&item.content, 72));
        println!();
    }
    Ok(())
}

fn print_news_detail(item: &NewsItem) {
    let now = Utc::now().with_timezone(&Local);
    println!();
    println_colored!(GOLD, "  {}", item.title);
    println_colored!(DIM, "  {}", format_relative(item.published_at, now));
    if !item.is_published {
        println_colored!(AMBER, "  Draft: not visible on the board");
    }
    println!();
    for line in item.content.lines() {
        println!("  {}", line);
    }
    if let Some(image) = &item.image_url {
        println!();
        println_colored!(DIM, "  Image: {}", image);
    }
    println!();
}

// ─── Events ──────────────────────────────────────────────────────────────────

pub fn handle_events(
    store: &dyn DataStore,
    config: &AppConfig,
    all: bool,
    id: Option<&str>,
) -> Result<()> {
    let twelve = config.display.twelve_hour;
    let feed = EventFeed {
        audience: audience(all),
    };
    if let Some(id) = id {
        let mut view = LiveItem::new(feed, id);
        view.load(store);
        return print_item(&view, |event| print_event_detail(event, twelve));
    }

    let mut col = LiveCollection::new(feed);
    col.load(store);

    println!();
    println_colored!(GOLD, "  Upcoming Events");
    println!();
    if report_load(&col, "No upcoming events.") {
        return Ok(());
    }

    for event in col.items() {
        let draft = if event.is_published { "" } else { " [draft]" };
        println_colored!(BOLD, "  {}{}", event.title, draft);
        println!("  {}", format_event_range(event.start_time, event.end_time, twelve));
        let mut meta = Vec::new();
        if let Some(location) = &event.location {
            meta.push(location.clone());
        }
        if let Some(capacity) = event.capacity_label() {
            meta.push(capacity);
        }
        meta.push(event.id.clone());
        println_colored!(DIM, "  {}", meta.join(" · "));
        println!();
    }
    Ok(())
}

fn print_event_detail(event: &EventItem, twelve: bool) {
    println!();
    println_colored!(GOLD, "  {}", event.title);
    println!("  {}", format_event_range(event.start_time, event.end_time, twelve));
    if let Some(location) = &event.location {
        println!("  {}", location);
    }
    if let Some(capacity) = event.capacity_label() {
        println_colored!(GREEN, "  {}", capacity);
    }
    if !event.is_published {
        println_colored!(AMBER, "  Draft: not visible on the board");
    }
    if let Some(description) = &event.description {
        println!();
        for line in description.lines() {
            println!("  {}", line);
        }
    }
    println!();
}

fn print_item<F: Feed>(view: &LiveItem<F>, print: impl Fn(&F::Item)) -> Result<()> {
    match (view.state(), view.item()) {
        (LoadState::Ready, Some(item)) => print(item),
        _ => {
            println!();
            println_colored!(
                RED,
                "  {}",
                view.error().unwrap_or(F::MESSAGES.item_failed)
            );
            println!();
        }
    }
    Ok(())
}

// ─── Contacts ────────────────────────────────────────────────────────────────

pub fn handle_contacts(store: &dyn DataStore) -> Result<()> {
    let mut col = LiveCollection::new(ContactFeed::default());
    col.load(store);

    println!();
    println_colored!(GOLD, "  Contact Us");
    println!();
    if report_load(&col, "No contact channels listed.") {
        return Ok(());
    }

    for channel in col.items() {
        println_colored!(BOLD, "  {}", channel.name);
        if let Some(description) = &channel.description {
            println!("  {}", description);
        }
        match channel.mailto_link() {
            Ok(link) => println_colored!(DIM, "  {}", link),
            Err(_) => println_colored!(DIM, "  {}", channel.contact_email),
        }
        println!();
    }
    Ok(())
}
