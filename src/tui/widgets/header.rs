use chrono::{DateTime, Local};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::prayer_times::PrayerBoard;
use crate::tui::theme;
use crate::utils::format::format_duration_minutes;

/// Masthead: organization on the left, clock and the next congregation on the right.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    organization: &str,
    board: &PrayerBoard,
    now: DateTime<Local>,
) {
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold().add_modifier(Modifier::BOLD))
        .style(theme::base());
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(inner);

    let left = vec![
        Line::from(vec![
            Span::styled(" جماعة  ", theme::gold().add_modifier(Modifier::BOLD)),
            Span::styled(organization.to_string(), theme::bold()),
        ]),
        Line::from(Span::styled(
            format!(" {}", now.format("%A, %b %-d, %Y")),
            theme::dim(),
        )),
    ];
    frame.render_widget(Paragraph::new(left), halves[0]);

    let upcoming = match (board.next(), board.countdown()) {
        (Some(slot), Some(minutes)) => Line::from(vec![
            Span::styled(slot.name.display_name(), theme::emerald()),
            Span::styled(" in ", theme::dim()),
            Span::styled(format_duration_minutes(minutes), theme::amber()),
            Span::raw(" "),
        ]),
        _ => Line::from(""),
    };
    let right = vec![
        Line::from(Span::styled(
            format!("{} ", now.format("%H:%M")),
            theme::amber().add_modifier(Modifier::BOLD),
        )),
        upcoming,
    ];
    frame.render_widget(Paragraph::new(right).alignment(Alignment::Right), halves[1]);
}
