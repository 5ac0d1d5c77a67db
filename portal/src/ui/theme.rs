//! Theme and styling constants for the TUI.

use ratatui::style::{Color, Modifier, Style};

use portal_proto::message::Sender;

/// Primary foreground color.
pub const FG_PRIMARY: Color = Color::White;

/// Secondary foreground color (dimmed text).
pub const FG_SECONDARY: Color = Color::Gray;

/// Highlight color for focused elements.
pub const HIGHLIGHT: Color = Color::Cyan;

/// Success indicator color.
pub const SUCCESS: Color = Color::Green;

/// Warning indicator color (notices).
pub const WARNING: Color = Color::Yellow;

/// Color for customer messages.
pub const CUSTOMER: Color = Color::LightBlue;

/// Color for support messages.
pub const SUPPORT: Color = Color::LightMagenta;

/// Panel title color for the tasks panel.
pub const TASKS_TITLE: Color = Color::Green;

/// Panel title color for the chat panel.
pub const CHAT_TITLE: Color = Color::Cyan;

/// Panel title color for the contact panel.
pub const CONTACT_TITLE: Color = Color::Blue;

/// Normal text style.
#[must_use]
pub fn normal() -> Style {
    Style::default().fg(FG_PRIMARY)
}

/// Dimmed text style (dates, completed tasks, placeholders).
#[must_use]
pub fn dimmed() -> Style {
    Style::default().fg(FG_SECONDARY)
}

/// Bold text style.
#[must_use]
pub fn bold() -> Style {
    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD)
}

/// Highlighted text style (focused panel borders).
#[must_use]
pub fn highlighted() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Selected item style (in lists).
#[must_use]
pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Border style for a panel depending on focus.
#[must_use]
pub fn border(is_focused: bool) -> Style {
    if is_focused { highlighted() } else { normal() }
}

/// Color for a message sender.
#[must_use]
pub const fn sender_color(sender: Sender) -> Color {
    match sender {
        Sender::Customer => CUSTOMER,
        Sender::Support => SUPPORT,
    }
}

/// Style for installer notes (italic, dim green).
#[must_use]
pub fn installer_note() -> Style {
    Style::default()
        .fg(Color::Rgb(120, 180, 120))
        .add_modifier(Modifier::ITALIC)
}

/// Style for timestamps (dark gray).
#[must_use]
pub fn timestamp() -> Style {
    Style::default().fg(Color::Rgb(120, 120, 120))
}

/// Style for the status bar background (dark background with white foreground).
#[must_use]
pub fn status_bar_bg() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 50))
}

/// Style for panel titles with a given color (bold).
#[must_use]
pub fn panel_title(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}
