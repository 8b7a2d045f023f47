pub mod contacts;
pub mod detail;
pub mod events;
pub mod header;
pub mod news;
pub mod next_prayer;
pub mod prayers;
pub mod statusbar;

use ratatui::text::{Line, Span};

use crate::live::LoadState;
use crate::tui::theme;

/// Placeholder lines for a list that has nothing to show yet.
///
/// Cached items win over an error: a failed refresh keeps the old list on
/// screen and the status bar carries the message.
pub(crate) fn placeholder(
    state: LoadState,
    error: Option<&str>,
    is_empty: bool,
    empty_message: &str,
) -> Option<Vec<Line<'static>>> {
    if !is_empty {
        return None;
    }
    let lines = match (state, error) {
        (LoadState::Idle | LoadState::Loading, _) => vec![
            Line::from(""),
            Line::from(Span::styled("  Loading…", theme::dim())),
        ],
        (_, Some(err)) => vec![
            Line::from(""),
            Line::from(Span::styled(format!("  {}", err), theme::red())),
            Line::from(""),
            Line::from(vec![
                Span::styled("  [r] ", theme::gold()),
                Span::styled("Try Again", theme::dim()),
            ]),
        ],
        _ => vec![
            Line::from(""),
            Line::from(Span::styled(format!("  {}", empty_message), theme::dim())),
        ],
    };
    Some(lines)
}
