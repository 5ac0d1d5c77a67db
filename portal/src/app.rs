//! Application state and event handling.
//!
//! [`App`] is the view layer's single owner of the [`Session`]: key events
//! are turned into session operations here, and everything the UI draws is
//! read from this struct.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use portal_proto::message::Sender;
use portal_proto::task::{Task, TaskId};

use crate::attachment::{DownscaleOptions, DownscaledImage, PendingAttachment};
use crate::chat::ChatError;
use crate::config::{ContactInfo, PortalConfig};
use crate::session::Session;
use crate::tasks::TaskError;

/// Prefix of the input command that attaches a photo.
pub const IMAGE_COMMAND: &str = "/image";

/// Which panel is currently focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    /// New-task input box (default).
    TaskInput,
    /// Open task list.
    Tasks,
    /// Chat input box.
    ChatInput,
}

/// What Enter does in the task input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskInputMode {
    /// Enter adds a new task.
    NewTask,
    /// Enter sets the installer note of this task.
    Note(TaskId),
}

/// A single-line text input with a character cursor.
#[derive(Debug, Clone, Default)]
pub struct InputLine {
    text: String,
    cursor: usize,
}

impl InputLine {
    /// Current text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in characters.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replaces the text and moves the cursor to the end.
    pub fn set(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.chars().count();
    }

    /// Clears the text.
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(i, _)| i)
    }

    /// Inserts a character at the cursor.
    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Deletes the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let at = self.byte_index(self.cursor - 1);
            self.text.remove(at);
            self.cursor -= 1;
        }
    }

    /// Moves the cursor left.
    pub const fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Moves the cursor right.
    pub fn right(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.cursor += 1;
        }
    }

    /// Moves the cursor to the start.
    pub const fn home(&mut self) {
        self.cursor = 0;
    }

    /// Moves the cursor to the end.
    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c) => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Left => self.left(),
            KeyCode::Right => self.right(),
            KeyCode::Home => self.home(),
            KeyCode::End => self.end(),
            _ => {}
        }
    }
}

/// Photo attachment state for one input box.
///
/// At most one attachment is in flight per slot; staging a new one drops
/// (and so cancels) the previous one.
#[derive(Default)]
pub struct AttachmentSlot {
    pending: Option<PendingAttachment>,
    ready: Option<DownscaledImage>,
}

impl AttachmentSlot {
    /// Starts preparing `path`, replacing whatever the slot held.
    pub fn stage(&mut self, path: PathBuf, options: DownscaleOptions) {
        self.ready = None;
        self.pending = Some(PendingAttachment::spawn(path, options));
    }

    /// Whether an attachment is still being prepared.
    #[must_use]
    pub const fn is_preparing(&self) -> bool {
        self.pending.is_some()
    }

    /// The prepared image, if any.
    #[must_use]
    pub const fn ready(&self) -> Option<&DownscaledImage> {
        self.ready.as_ref()
    }

    /// Drops any pending or prepared attachment.
    pub fn clear(&mut self) {
        self.pending = None;
        self.ready = None;
    }

    /// Collects a finished result. Returns a notice to show, if any.
    pub fn poll(&mut self) -> Option<String> {
        let result = self.pending.as_mut()?.try_take()?;
        self.pending = None;
        match result {
            Ok(image) => {
                let notice = format!("Photo attached ({}x{})", image.width, image.height);
                self.ready = Some(image);
                Some(notice)
            }
            Err(e) => {
                tracing::warn!(error = %e, "attachment failed");
                Some(format!("Could not attach photo: {e}"))
            }
        }
    }
}

/// Main application state.
pub struct App {
    /// Stores and persistence.
    pub session: Session,
    /// Which panel is focused.
    pub focus: PanelFocus,
    /// Task input box.
    pub task_input: InputLine,
    /// What the task input is editing.
    pub task_input_mode: TaskInputMode,
    /// Chat input box.
    pub chat_input: InputLine,
    /// Selected index among open tasks.
    pub selected_task: usize,
    /// Scroll offset for the message list.
    pub message_scroll: usize,
    /// Photo for the next task.
    pub task_attachment: AttachmentSlot,
    /// Photo for the next message.
    pub chat_attachment: AttachmentSlot,
    /// One-line notice shown in the status bar until the next key press.
    pub notice: Option<String>,
    /// Who typed messages are sent as.
    pub role: Sender,
    /// Contact card contents.
    pub contact: ContactInfo,
    /// Attachment settings.
    pub downscale: DownscaleOptions,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl App {
    /// Create the application around an opened session.
    #[must_use]
    pub fn new(session: Session, config: &PortalConfig) -> Self {
        let message_scroll = session.thread().len().saturating_sub(1);
        Self {
            session,
            focus: PanelFocus::TaskInput,
            task_input: InputLine::default(),
            task_input_mode: TaskInputMode::NewTask,
            chat_input: InputLine::default(),
            selected_task: 0,
            message_scroll,
            task_attachment: AttachmentSlot::default(),
            chat_attachment: AttachmentSlot::default(),
            notice: None,
            role: config.role,
            contact: config.contact.clone(),
            downscale: config.downscale_options(),
            should_quit: false,
        }
    }

    /// Handle a key event.
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        self.notice = None;

        // Global shortcuts
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            (KeyCode::Esc, _) => {
                if let TaskInputMode::Note(_) = self.task_input_mode {
                    self.task_input_mode = TaskInputMode::NewTask;
                    self.task_input.clear();
                } else {
                    self.should_quit = true;
                }
                return;
            }
            (KeyCode::BackTab, _) | (KeyCode::Tab, KeyModifiers::SHIFT) => {
                self.cycle_focus_backward();
                return;
            }
            (KeyCode::Tab, _) => {
                self.cycle_focus_forward();
                return;
            }
            _ => {}
        }

        // Focus-specific shortcuts
        match self.focus {
            PanelFocus::TaskInput => self.handle_task_input_key(key),
            PanelFocus::Tasks => self.handle_task_list_key(key),
            PanelFocus::ChatInput => self.handle_chat_input_key(key),
        }
    }

    /// Collect finished attachments. Called once per UI tick.
    pub fn poll_attachments(&mut self) {
        if let Some(notice) = self.task_attachment.poll() {
            self.notice = Some(notice);
        }
        if let Some(notice) = self.chat_attachment.poll() {
            self.notice = Some(notice);
        }
    }

    /// Writes pending changes before exit.
    pub fn shutdown(&mut self) {
        self.task_attachment.clear();
        self.chat_attachment.clear();
        self.session.flush();
    }

    /// Open tasks in display order.
    #[must_use]
    pub fn open_tasks(&self) -> Vec<&Task> {
        self.session.tasks().open().collect()
    }

    /// The currently selected open task.
    #[must_use]
    pub fn selected_open_task(&self) -> Option<&Task> {
        self.session.tasks().open().nth(self.selected_task)
    }

    /// Handle key event when the task input is focused.
    fn handle_task_input_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Enter {
            self.submit_task_input();
        } else {
            self.task_input.handle_key(key.code);
        }
    }

    /// Handle key event when the task list is focused.
    fn handle_task_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_task = self.selected_task.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_task + 1 < self.session.tasks().open_len() {
                    self.selected_task += 1;
                }
            }
            KeyCode::Char('K') => self.move_selected_task_up(),
            KeyCode::Char('J') => self.move_selected_task_down(),
            KeyCode::Enter | KeyCode::Char('c') => self.complete_selected_task(),
            KeyCode::Char('n') => self.start_note(),
            _ => {}
        }
    }

    /// Handle key event when the chat input is focused.
    fn handle_chat_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_chat_input(),
            KeyCode::PageUp => self.message_scroll = self.message_scroll.saturating_sub(1),
            KeyCode::PageDown => {
                if self.message_scroll + 1 < self.session.thread().len() {
                    self.message_scroll += 1;
                }
            }
            code => self.chat_input.handle_key(code),
        }
    }

    /// Cycle focus forward: task input -> tasks -> chat input -> task input.
    const fn cycle_focus_forward(&mut self) {
        self.focus = match self.focus {
            PanelFocus::TaskInput => PanelFocus::Tasks,
            PanelFocus::Tasks => PanelFocus::ChatInput,
            PanelFocus::ChatInput => PanelFocus::TaskInput,
        };
    }

    /// Cycle focus backward.
    const fn cycle_focus_backward(&mut self) {
        self.focus = match self.focus {
            PanelFocus::TaskInput => PanelFocus::ChatInput,
            PanelFocus::ChatInput => PanelFocus::Tasks,
            PanelFocus::Tasks => PanelFocus::TaskInput,
        };
    }

    fn submit_task_input(&mut self) {
        let text = self.task_input.text().to_string();

        if let TaskInputMode::Note(id) = &self.task_input_mode {
            let id = id.clone();
            match self.session.annotate_task(&id, Some(&text)) {
                Ok(()) => self.notice = Some("Note saved".to_string()),
                Err(e) => self.notice = Some(format!("Could not save note: {e}")),
            }
            self.task_input_mode = TaskInputMode::NewTask;
            self.task_input.clear();
            return;
        }

        if let Some(path) = parse_image_command(&text) {
            self.notice = Some(format!("Preparing {}...", path.display()));
            self.task_attachment.stage(path, self.downscale);
            self.task_input.clear();
            return;
        }

        if self.task_attachment.is_preparing() {
            self.notice = Some("Still preparing photo, try again in a moment".to_string());
            return;
        }

        let image = self.task_attachment.ready().map(|d| d.image.clone());
        match self.session.add_task(&text, image) {
            Ok(_) => {
                self.task_input.clear();
                self.task_attachment.clear();
            }
            Err(TaskError::TextEmpty) => {
                self.notice = Some("Describe the task first".to_string());
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn submit_chat_input(&mut self) {
        let text = self.chat_input.text().to_string();

        if let Some(path) = parse_image_command(&text) {
            self.notice = Some(format!("Preparing {}...", path.display()));
            self.chat_attachment.stage(path, self.downscale);
            self.chat_input.clear();
            return;
        }

        if self.chat_attachment.is_preparing() {
            self.notice = Some("Still preparing photo, try again in a moment".to_string());
            return;
        }

        let image = self.chat_attachment.ready().map(|d| d.image.clone());
        match self.session.send_message(Some(&text), image, self.role) {
            Ok(()) => {
                self.chat_input.clear();
                self.chat_attachment.clear();
                self.message_scroll = self.session.thread().len().saturating_sub(1);
            }
            Err(ChatError::Empty) => {
                self.notice = Some("Type a message or attach an image".to_string());
            }
        }
    }

    fn complete_selected_task(&mut self) {
        let Some(id) = self.selected_open_task().map(|t| t.id.clone()) else {
            return;
        };
        if let Err(e) = self.session.complete_task(&id) {
            self.notice = Some(e.to_string());
        }
        self.clamp_selection();
    }

    fn move_selected_task_up(&mut self) {
        if self.selected_task == 0 {
            return;
        }
        let to = self.selected_task - 1;
        if self.session.reorder_tasks(self.selected_task, to).is_ok() {
            self.selected_task = to;
        }
    }

    fn move_selected_task_down(&mut self) {
        let to = self.selected_task + 1;
        if to >= self.session.tasks().open_len() {
            return;
        }
        if self.session.reorder_tasks(self.selected_task, to).is_ok() {
            self.selected_task = to;
        }
    }

    fn start_note(&mut self) {
        let Some(task) = self.selected_open_task() else {
            return;
        };
        let id = task.id.clone();
        let existing = task.installer_note.clone().unwrap_or_default();
        self.task_input.set(&existing);
        self.task_input_mode = TaskInputMode::Note(id);
        self.focus = PanelFocus::TaskInput;
    }

    fn clamp_selection(&mut self) {
        let open = self.session.tasks().open_len();
        if self.selected_task >= open {
            self.selected_task = open.saturating_sub(1);
        }
    }
}

/// Parses `/image <path>`. Returns `None` for any other input.
#[must_use]
pub fn parse_image_command(input: &str) -> Option<PathBuf> {
    let rest = input.trim().strip_prefix(IMAGE_COMMAND)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let path = rest.trim();
    (!path.is_empty()).then(|| PathBuf::from(path))
}
