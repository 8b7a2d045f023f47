use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders};

pub const BG: Color = Color::Rgb(12, 20, 18);
pub const SURFACE: Color = Color::Rgb(18, 30, 27);
pub const BORDER: Color = Color::Rgb(40, 64, 57);
pub const TEXT: Color = Color::Rgb(226, 232, 222);
pub const TEXT_DIM: Color = Color::Rgb(118, 140, 130);
pub const GOLD: Color = Color::Rgb(201, 168, 76);
pub const EMERALD: Color = Color::Rgb(72, 170, 128);
pub const AMBER: Color = Color::Rgb(214, 146, 64);
pub const RED: Color = Color::Rgb(196, 88, 70);
pub const HIGHLIGHT: Color = Color::Rgb(30, 52, 45);

const fn fg(color: Color) -> Style {
    Style::new().fg(color)
}

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn dim() -> Style {
    fg(TEXT_DIM)
}

pub fn gold() -> Style {
    fg(GOLD)
}

pub fn emerald() -> Style {
    fg(EMERALD)
}

pub fn amber() -> Style {
    fg(AMBER)
}

pub fn red() -> Style {
    fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn selected() -> Style {
    Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Rounded panel with a gold title; focused panels get a gold border.
pub fn panel(title: &str, focused: bool) -> Block<'static> {
    let border = if focused { gold() } else { fg(BORDER) };
    Block::default()
        .title(Span::styled(format!(" {} ", title), gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .style(surface())
}
