//! Customer/support message thread.
//!
//! [`MessageThread`] is append-only: messages are never edited, removed or
//! reordered, and the newest message is always last.

pub mod thread;

pub use thread::MessageThread;

/// Errors that can occur when appending to the thread.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChatError {
    /// Neither text nor an image was supplied.
    #[error("message needs text or an image")]
    Empty,
}
