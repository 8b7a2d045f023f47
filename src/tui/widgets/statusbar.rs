use chrono::{DateTime, Local, Utc};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::tui::theme;

pub struct Status<'a> {
    pub error: Option<&'a str>,
    pub last_updated: Option<DateTime<Utc>>,
    pub in_detail: bool,
}

pub fn render(frame: &mut Frame, area: Rect, status: &Status<'_>) {
    let hints: &[(&str, &str)] = if status.in_detail {
        &[("[r]", " reload  "), ("[Esc]", " back")]
    } else {
        &[
            ("[1-4]", " tabs  "),
            ("[↑↓]", " move  "),
            ("[Enter]", " open  "),
            ("[r]", " refresh  "),
            ("[?]", " help  "),
            ("[q]", " quit"),
        ]
    };

    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(*key, theme::gold()));
        spans.push(Span::styled(*label, theme::dim()));
    }

    let right = match (status.error, status.last_updated) {
        (Some(err), _) => Span::styled(format!("{} ", err), theme::red()),
        (None, Some(ts)) => Span::styled(
            format!("updated {} ", ts.with_timezone(&Local).format("%H:%M:%S")),
            theme::dim(),
        ),
        (None, None) => Span::raw(""),
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(48)])
        .split(area);

    frame.render_widget(Paragraph::new(Line::from(spans)), columns[0]);
    frame.render_widget(
        Paragraph::new(Line::from(right)).alignment(Alignment::Right),
        columns[1],
    );
}
