use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use super::placeholder;
use crate::live::{ContactFeed, LiveCollection};
use crate::tui::theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    contacts: &LiveCollection<ContactFeed>,
    selected: usize,
) {
    let block = theme::panel("Contact Us", true);

    if let Some(lines) = placeholder(
        contacts.state(),
        contacts.error(),
        contacts.items().is_empty(),
        "No contact channels listed.",
    ) {
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let items: Vec<ListItem> = contacts
        .items()
        .iter()
        .map(|channel| {
            let mut lines = vec![Line::from(Span::styled(
                format!("  {}", channel.name),
                theme::bold(),
            ))];
            if let Some(description) = &channel.description {
                lines.push(Line::from(Span::styled(
                    format!("  {}", description),
                    theme::dim(),
                )));
            }
            let link = channel
                .mailto_link()
                .map(|url| url.to_string())
                .unwrap_or_else(|_| channel.contact_email.clone());
            lines.push(Line::from(Span::styled(format!("  {}", link), theme::gold())));
            lines.push(Line::from(""));
            ListItem::new(lines)
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(selected));
    let list = List::new(items).block(block).highlight_style(theme::selected());
    frame.render_stateful_widget(list, area, &mut state);
}
