//! Task panel rendering (open tasks, completed tasks, new-task input).

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use portal_proto::task::Task;

use super::{input, theme};
use crate::app::{App, PanelFocus, TaskInputMode};

/// Render the task panel.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    render_list(frame, chunks[0], app);
    render_input(frame, chunks[1], app);
}

fn render_list(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus == PanelFocus::Tasks;
    let tasks = app.session.tasks();

    let mut items: Vec<ListItem> = tasks
        .open()
        .enumerate()
        .map(|(idx, task)| {
            let style = if idx == app.selected_task && is_focused {
                theme::selected()
            } else {
                theme::normal()
            };
            ListItem::new(task_lines(task, "[ ]")).style(style)
        })
        .collect();

    if tasks.completed().next().is_some() {
        items.push(ListItem::new(Line::from(Span::styled(
            "── Completed ──",
            theme::dimmed(),
        ))));
        items.extend(
            tasks
                .completed()
                .map(|task| ListItem::new(task_lines(task, "[✓]")).style(theme::dimmed())),
        );
    }

    let title = format!("Tasks ({} open)", tasks.open_len());
    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::TASKS_TITLE)))
        .borders(Borders::ALL)
        .border_style(theme::border(is_focused));

    frame.render_widget(List::new(items).block(block), area);
}

fn task_lines<'a>(task: &'a Task, checkbox: &'static str) -> Vec<Line<'a>> {
    let mut spans = vec![
        Span::raw(checkbox),
        Span::raw(" "),
        Span::raw(task.text.as_str()),
        Span::raw("  "),
        Span::styled(task.date.as_str(), theme::timestamp()),
    ];
    if task.image.is_some() {
        spans.push(Span::styled(" [photo]", theme::dimmed()));
    }

    let mut lines = vec![Line::from(spans)];
    if let Some(note) = &task.installer_note {
        lines.push(Line::from(vec![
            Span::raw("    ↳ "),
            Span::styled(note.as_str(), theme::installer_note()),
        ]));
    }
    lines
}

fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let (base, placeholder) = match app.task_input_mode {
        TaskInputMode::NewTask => ("New task", "Describe a task, or /image <path>"),
        TaskInputMode::Note(_) => ("Installer note", "Blank clears the note"),
    };
    let title = match input::attachment_label(&app.task_attachment) {
        Some(label) if app.task_input_mode == TaskInputMode::NewTask => {
            format!("{base} ({label})")
        }
        _ => base.to_string(),
    };

    input::render(
        frame,
        area,
        &title,
        &app.task_input,
        placeholder,
        app.focus == PanelFocus::TaskInput,
    );
}
