//! Input box rendering shared by the task and chat panels.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::theme;
use crate::app::{AttachmentSlot, InputLine};

/// Render a single-line input box.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    input: &InputLine,
    placeholder: &str,
    is_focused: bool,
) {
    let input_line = if input.text().is_empty() && !is_focused {
        Line::from(Span::styled(placeholder.to_string(), theme::dimmed()))
    } else if is_focused {
        Line::from(Span::styled(with_cursor(input), theme::normal()))
    } else {
        Line::from(Span::styled(input.text().to_string(), theme::normal()))
    };

    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(theme::border(is_focused));

    frame.render_widget(Paragraph::new(input_line).block(block), area);
}

/// Title suffix describing an attachment slot.
#[must_use]
pub fn attachment_label(slot: &AttachmentSlot) -> Option<String> {
    if slot.is_preparing() {
        Some("photo: preparing...".to_string())
    } else {
        slot.ready()
            .map(|img| format!("photo: {}x{}", img.width, img.height))
    }
}

/// The input text with a block cursor inserted at the cursor position.
fn with_cursor(input: &InputLine) -> String {
    let mut display: String = input.text().chars().take(input.cursor()).collect();
    display.push('█');
    display.extend(input.text().chars().skip(input.cursor()));
    display
}
