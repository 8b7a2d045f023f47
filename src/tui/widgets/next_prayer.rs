use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::prayer_times::PrayerBoard;
use crate::tui::theme;
use crate::utils::format::{format_clock, format_duration_minutes};

pub fn render(frame: &mut Frame, area: Rect, board: &PrayerBoard, twelve_hour: bool) {
    let block = theme::panel("Next Prayer", false);

    let content: Vec<Line> = match (board.next(), board.countdown()) {
        (Some(slot), Some(minutes)) => vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  {}", slot.name.display_name().to_uppercase()),
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled("  iqama ", theme::dim()),
                Span::styled(format_clock(slot.congregation_time, twelve_hour), theme::bold()),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("  in  ", theme::dim()),
                Span::styled(
                    format_duration_minutes(minutes),
                    theme::amber().add_modifier(Modifier::BOLD),
                ),
            ]),
        ],
        _ => vec![
            Line::from(""),
            Line::from(Span::styled("  No upcoming prayer", theme::dim())),
        ],
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}
