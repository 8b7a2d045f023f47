use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
};

use super::placeholder;
use crate::prayer_times::PrayerBoard;
use crate::tui::theme;
use crate::utils::format::format_clock;

pub fn render(frame: &mut Frame, area: Rect, board: &PrayerBoard, twelve_hour: bool) {
    let block = theme::panel("Congregation Times", true);
    let slots = board.slots();

    if let Some(lines) = placeholder(
        slots.state(),
        slots.error(),
        slots.items().is_empty(),
        "Prayer times have not been set yet.",
    ) {
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let mut items = vec![ListItem::new(Line::from(vec![
        Span::styled(format!("  {:<10}", "Prayer"), theme::dim()),
        Span::styled(format!("{:>10}", "Adhan"), theme::dim()),
        Span::styled(format!("{:>10}", "Iqama"), theme::dim()),
    ]))];

    for slot in slots.items() {
        let is_next = board.next().is_some_and(|n| n.id == slot.id);
        let name_style = if is_next {
            theme::gold().add_modifier(Modifier::BOLD)
        } else {
            theme::bold()
        };
        let adhan = slot
            .call_time
            .map(|t| format_clock(t, twelve_hour))
            .unwrap_or_else(|| "—".to_string());

        let mut spans = vec![
            Span::styled(format!("  {:<10}", slot.name.display_name()), name_style),
            Span::styled(format!("{:>10}", adhan), theme::dim()),
            Span::styled(
                format!("{:>10}", format_clock(slot.congregation_time, twelve_hour)),
                if is_next { theme::emerald() } else { theme::bold() },
            ),
        ];
        if is_next {
            spans.push(Span::styled("  ◀ next", theme::gold()));
        }
        let mut lines = vec![Line::from(spans)];
        if let Some(note) = &slot.note {
            lines.push(Line::from(Span::styled(format!("    {}", note), theme::dim())));
        }
        items.push(ListItem::new(lines));
    }

    frame.render_widget(List::new(items).block(block), area);
}
