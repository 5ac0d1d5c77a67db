//! Customer task list.
//!
//! [`TaskList`] owns the ordered collection of tasks and exposes the only
//! operations the portal performs on it: add, complete, reorder and
//! annotate. Persistence is the caller's concern (see `session`).

pub mod list;

pub use list::TaskList;

use thiserror::Error;

/// Errors that can occur during task operations.
///
/// Every error leaves the list unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Task text is empty after trimming.
    #[error("task text cannot be empty")]
    TextEmpty,
    /// Task with the given ID was not found.
    #[error("task not found: {0}")]
    NotFound(String),
    /// A reorder index is outside the open task list.
    #[error("index {index} out of range for {len} open tasks")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of open tasks.
        len: usize,
    },
}
