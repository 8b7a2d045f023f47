use chrono::{DateTime, Local};
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use super::placeholder;
use crate::live::{LiveCollection, NewsFeed};
use crate::tui::theme;
use crate::utils::format::{format_relative, truncate_text};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    news: &LiveCollection<NewsFeed>,
    selected: usize,
    now: DateTime<Local>,
) {
    let block = theme::panel("Announcements", true);

    if let Some(lines) = placeholder(
        news.state(),
        news.error(),
        news.items().is_empty(),
        "No announcements right now.",
    ) {
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let width = area.width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = news
        .items()
        .iter()
        .map(|item| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("  {}", item.title), theme::bold()),
                    Span::styled(
                        format!("  {}", format_relative(item.published_at, now)),
                        theme::dim(),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("  {}", truncate_text(&item.content, width)),
                    theme::dim(),
                )),
                Line::from(""),
            ])
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(selected));
    let list = List::new(items).block(block).highlight_style(theme::selected());
    frame.render_stateful_widget(list, area, &mut state);
}
