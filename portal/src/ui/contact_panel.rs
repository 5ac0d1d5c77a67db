//! Contact card rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::theme;
use crate::app::App;

/// Render the static contact card.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let contact = &app.contact;
    let lines = vec![
        Line::from(Span::styled(contact.name.as_str(), theme::bold())),
        Line::from(""),
        Line::from(vec![
            Span::styled("Phone ", theme::dimmed()),
            Span::raw(contact.phone.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Email ", theme::dimmed()),
            Span::raw(contact.email.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Hours ", theme::dimmed()),
            Span::raw(contact.hours.as_str()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Signed in as ", theme::dimmed()),
            Span::styled(
                app.role.to_string(),
                theme::normal().fg(theme::sender_color(app.role)),
            ),
        ]),
    ];

    let block = Block::default()
        .title(Span::styled("Contact", theme::panel_title(theme::CONTACT_TITLE)))
        .borders(Borders::ALL)
        .border_style(theme::normal());

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
