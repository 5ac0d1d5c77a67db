//! The task list store.

use std::collections::HashSet;

use portal_proto::inline::InlineImage;
use portal_proto::task::{Task, TaskId};

use super::TaskError;

/// Default chrono format for task creation dates.
pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Ordered collection of customer tasks.
///
/// The backing sequence holds open and completed tasks interleaved in the
/// order they were created or moved. Reordering is expressed in terms of
/// the open tasks only (the order the customer sees and drags); completed
/// tasks never move relative to each other.
#[derive(Debug, Clone)]
pub struct TaskList {
    tasks: Vec<Task>,
    date_format: String,
}

impl Default for TaskList {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskList {
    /// Creates an empty list using [`DEFAULT_DATE_FORMAT`].
    #[must_use]
    pub fn new() -> Self {
        Self::from_tasks(Vec::new())
    }

    /// Seeds a list from previously persisted tasks.
    ///
    /// Ids must be unique: when a stored list repeats an id, the first task
    /// with that id is kept and later ones are dropped.
    #[must_use]
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut seen = HashSet::new();
        let loaded = tasks.len();
        let tasks: Vec<Task> = tasks
            .into_iter()
            .filter(|t| seen.insert(t.id.clone()))
            .collect();
        if tasks.len() < loaded {
            tracing::warn!(
                dropped = loaded - tasks.len(),
                "stored task list repeats ids, keeping the first of each"
            );
        }
        Self {
            tasks,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// Sets the chrono format used for new task dates.
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Appends a new open task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TextEmpty`] if `text` is blank.
    pub fn add(&mut self, text: &str, image: Option<InlineImage>) -> Result<&Task, TaskError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaskError::TextEmpty);
        }

        let task = Task::new(text.to_string(), self.today(), image);
        tracing::debug!(task_id = %task.id, "task added");
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Marks a task completed. Completing an already completed task is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] if no task has that id.
    pub fn complete(&mut self, id: &TaskId) -> Result<(), TaskError> {
        let task = self.get_mut(id)?;
        task.completed = true;
        Ok(())
    }

    /// Moves the open task at `from` so that it ends up at `to`, both
    /// indices counted over open tasks only.
    ///
    /// In the backing sequence the task moves to the slot of the open task
    /// currently at `to`; every other task keeps its relative order. With no
    /// completed tasks this is a plain list move: `[A, B, C]` with `0 -> 2`
    /// gives `[B, C, A]`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::IndexOutOfRange`] if either index is not a valid
    /// open-task position.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), TaskError> {
        let open: Vec<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_open())
            .map(|(i, _)| i)
            .collect();

        for index in [from, to] {
            if index >= open.len() {
                return Err(TaskError::IndexOutOfRange {
                    index,
                    len: open.len(),
                });
            }
        }

        move_element(&mut self.tasks, open[from], open[to]);
        Ok(())
    }

    /// Sets or clears the installer note. A blank note clears it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] if no task has that id.
    pub fn annotate(&mut self, id: &TaskId, note: Option<&str>) -> Result<(), TaskError> {
        let note = note.map(str::trim).filter(|n| !n.is_empty()).map(String::from);
        let task = self.get_mut(id)?;
        task.installer_note = note;
        Ok(())
    }

    /// All tasks in backing order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Open tasks in display order.
    pub fn open(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.is_open())
    }

    /// Completed tasks in display order.
    pub fn completed(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.completed)
    }

    /// Number of open tasks.
    #[must_use]
    pub fn open_len(&self) -> usize {
        self.open().count()
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Total number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// A copy of the backing sequence, for persistence.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    /// Today's date in the configured format, falling back to the default
    /// format if the configured one is invalid.
    fn today(&self) -> String {
        use std::fmt::Write;

        let now = chrono::Local::now();
        let mut date = String::new();
        if write!(date, "{}", now.format(&self.date_format)).is_err() {
            tracing::warn!(format = %self.date_format, "invalid date format, using default");
            date.clear();
            let _ = write!(date, "{}", now.format(DEFAULT_DATE_FORMAT));
        }
        date
    }

    fn get_mut(&mut self, id: &TaskId) -> Result<&mut Task, TaskError> {
        self.tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }
}

/// Moves `items[from]` to index `to`, shifting the elements in between.
fn move_element<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}
