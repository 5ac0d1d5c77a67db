//! Chat panel rendering (message list + input box).

use chrono::{DateTime, Local};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use super::{input, theme};
use crate::app::{App, PanelFocus};

/// Render the chat panel (messages + input box).
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    // Split into message area and input area
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    render_messages(frame, chunks[0], app);
    render_input(frame, chunks[1], app);
}

/// Render the message list.
fn render_messages(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .session
        .thread()
        .messages()
        .iter()
        .map(|msg| {
            let mut spans = vec![
                Span::styled(display_time(&msg.timestamp), theme::timestamp()),
                Span::raw(" "),
                Span::styled(
                    msg.sender.label(),
                    theme::bold().fg(theme::sender_color(msg.sender)),
                ),
                Span::raw(": "),
            ];
            if let Some(text) = &msg.text {
                spans.push(Span::styled(text.as_str(), theme::normal()));
            }
            if msg.has_image() {
                if msg.text.is_some() {
                    spans.push(Span::raw(" "));
                }
                spans.push(Span::styled("[photo]", theme::dimmed()));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let block = Block::default()
        .title(Span::styled("Chat", theme::panel_title(theme::CHAT_TITLE)))
        .borders(Borders::ALL)
        .border_style(theme::border(false));

    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(app.message_scroll.min(items.len() - 1)));
    }

    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

/// Render the input box.
fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let title = input::attachment_label(&app.chat_attachment)
        .map_or_else(|| "Message".to_string(), |label| format!("Message ({label})"));

    input::render(
        frame,
        area,
        &title,
        &app.chat_input,
        "Type a message, or /image <path>",
        app.focus == PanelFocus::ChatInput,
    );
}

/// Formats an RFC 3339 timestamp as local `HH:MM`. Unparseable values are
/// shown as-is.
fn display_time(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp).map_or_else(
        |_| timestamp.to_string(),
        |t| t.with_timezone(&Local).format("%H:%M").to_string(),
    )
}
