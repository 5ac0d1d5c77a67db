//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, PanelFocus, TaskInputMode};

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = match (app.focus, &app.task_input_mode) {
        (PanelFocus::TaskInput, TaskInputMode::Note(_)) => {
            "Enter: save note | Esc: cancel note | Tab: switch panel"
        }
        (PanelFocus::TaskInput, TaskInputMode::NewTask) => {
            "Enter: add task | /image <path>: attach | Tab: switch panel | Esc: quit"
        }
        (PanelFocus::Tasks, _) => {
            "↑↓/jk: select | Enter/c: complete | J/K: move | n: note | Tab: switch | Esc: quit"
        }
        (PanelFocus::ChatInput, _) => {
            "Enter: send | /image <path>: attach | PgUp/PgDn: scroll | Tab: switch | Esc: quit"
        }
    };

    let (dot_color, save_text) = if app.session.has_pending_writes() {
        (theme::WARNING, "Saving...")
    } else {
        (theme::SUCCESS, "Saved")
    };

    let mut spans = vec![
        Span::styled(concat!("Portal v", env!("CARGO_PKG_VERSION")), theme::bold()),
        Span::raw(" | "),
        Span::styled("●", theme::normal().fg(dot_color)),
        Span::raw(format!(" {save_text}")),
        Span::raw(" | "),
    ];
    if let Some(notice) = &app.notice {
        spans.push(Span::styled(notice.as_str(), theme::bold().fg(theme::WARNING)));
    } else {
        spans.push(Span::styled(help_text, theme::dimmed()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
