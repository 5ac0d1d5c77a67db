//! Task records for the customer task list.
//!
//! A [`Task`] is one unit of customer-requested work. The list is persisted
//! as a single JSON array under the `tasks` key; its order is the display
//! order for both open and completed tasks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::inline::InlineImage;

/// Opaque unique identifier for a task.
///
/// Freshly created ids are UUID v7 strings; ids read back from storage are
/// kept verbatim whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new time-ordered task identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Wraps an existing identifier string.
    #[must_use]
    pub const fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A customer task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// Free-text description.
    pub text: String,
    /// Human-readable creation date (e.g. `10/19/2026`).
    pub date: String,
    /// Optional photo attached when the task was created.
    #[serde(default)]
    pub image: Option<InlineImage>,
    /// Whether the task has been completed.
    #[serde(default)]
    pub completed: bool,
    /// Optional note left by the installer.
    #[serde(default)]
    pub installer_note: Option<String>,
}

impl Task {
    /// Creates an open task with no installer note.
    #[must_use]
    pub fn new(text: String, date: String, image: Option<InlineImage>) -> Self {
        Self {
            id: TaskId::new(),
            text,
            date,
            image,
            completed: false,
            installer_note: None,
        }
    }

    /// Whether the task is still open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !self.completed
    }
}
