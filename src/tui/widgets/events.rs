use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use super::placeholder;
use crate::live::{EventFeed, LiveCollection};
use crate::tui::theme;
use crate::utils::format::format_event_range;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    events: &LiveCollection<EventFeed>,
    selected: usize,
    twelve_hour: bool,
) {
    let block = theme::panel("Upcoming Events", true);

    if let Some(lines) = placeholder(
        events.state(),
        events.error(),
        events.items().is_empty(),
        "No upcoming events.",
    ) {
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let items: Vec<ListItem> = events
        .items()
        .iter()
        .map(|event| {
            let mut meta = vec![Span::styled(
                format!("  {}", format_event_range(event.start_time, event.end_time, twelve_hour)),
                theme::amber(),
            )];
            if let Some(location) = &event.location {
                meta.push(Span::styled(format!("  ·  {}", location), theme::dim()));
            }
            if let Some(capacity) = event.capacity_label() {
                meta.push(Span::styled(format!("  ·  {}", capacity), theme::emerald()));
            }
            ListItem::new(vec![
                Line::from(Span::styled(format!("  {}", event.title), theme::bold())),
                Line::from(meta),
                Line::from(""),
            ])
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(selected));
    let list = List::new(items).block(block).highlight_style(theme::selected());
    frame.render_stateful_widget(list, area, &mut state);
}
