use chrono::{DateTime, Local};
use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use crate::live::{EventFeed, Feed, LiveItem, NewsFeed};
use crate::models::{EventItem, NewsItem};
use crate::tui::theme;
use crate::utils::format::{format_event_range, format_relative};

/// Loading / unavailable / failed lines for a single-row view.
fn status_lines<F: Feed>(view: &LiveItem<F>) -> Vec<Line<'static>> {
    let message = view.error().unwrap_or("Loading…").to_string();
    let style = if view.error().is_some() { theme::red() } else { theme::dim() };
    vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", message), style)),
        Line::from(""),
        Line::from(vec![
            Span::styled("  [r] ", theme::gold()),
            Span::styled("Try Again  ", theme::dim()),
            Span::styled("[Esc] ", theme::gold()),
            Span::styled("Back", theme::dim()),
        ]),
    ]
}

fn body_lines(text: &str) -> impl Iterator<Item = Line<'static>> + '_ {
    text.lines().map(|l| Line::from(format!("  {}", l)))
}

pub fn render_news(frame: &mut Frame, area: Rect, view: &LiveItem<NewsFeed>, now: DateTime<Local>) {
    let lines = match view.item() {
        Some(item) => news_lines(item, now),
        None => status_lines(view),
    };
    let paragraph = Paragraph::new(lines)
        .block(theme::panel("Announcement", true))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn news_lines(item: &NewsItem, now: DateTime<Local>) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", item.title),
            theme::gold().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("  {}", format_relative(item.published_at, now)),
            theme::dim(),
        )),
        Line::from(""),
    ];
    lines.extend(body_lines(&item.content));
    if let Some(image) = &item.image_url {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", image), theme::dim())));
    }
    lines
}

pub fn render_event(frame: &mut Frame, area: Rect, view: &LiveItem<EventFeed>, twelve_hour: bool) {
    let lines = match view.item() {
        Some(event) => event_lines(event, twelve_hour),
        None => status_lines(view),
    };
    let paragraph = Paragraph::new(lines)
        .block(theme::panel("Event", true))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn event_lines(event: &EventItem, twelve_hour: bool) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", event.title),
            theme::gold().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("  {}", format_event_range(event.start_time, event.end_time, twelve_hour)),
            theme::amber(),
        )),
    ];
    if let Some(location) = &event.location {
        lines.push(Line::from(Span::styled(format!("  {}", location), theme::bold())));
    }
    if let Some(capacity) = event.capacity_label() {
        lines.push(Line::from(Span::styled(format!("  {}", capacity), theme::emerald())));
    }
    if let Some(description) = &event.description {
        lines.push(Line::from(""));
        lines.extend(body_lines(description));
    }
    lines
}
