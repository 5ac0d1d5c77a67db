//! The message thread store.

use chrono::{SecondsFormat, Utc};

use portal_proto::inline::InlineImage;
use portal_proto::message::{Message, Sender};

use super::ChatError;

/// Ordered, append-only list of messages.
#[derive(Debug, Clone, Default)]
pub struct MessageThread {
    messages: Vec<Message>,
}

impl MessageThread {
    /// Creates an empty thread.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Seeds a thread from previously persisted messages.
    #[must_use]
    pub const fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Appends a message from `sender`.
    ///
    /// Blank text counts as no text.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Empty`] if there is neither text nor an image.
    pub fn append(
        &mut self,
        text: Option<&str>,
        image: Option<InlineImage>,
        sender: Sender,
    ) -> Result<&Message, ChatError> {
        let text = text.map(str::trim).filter(|t| !t.is_empty());
        if text.is_none() && image.is_none() {
            return Err(ChatError::Empty);
        }

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let message = Message::new(text.map(String::from), image, sender, timestamp);
        tracing::debug!(message_id = %message.id, %sender, "message appended");
        self.messages.push(message);
        Ok(&self.messages[self.messages.len() - 1])
    }

    /// All messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The newest message.
    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the thread is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// A copy of the thread, for persistence.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }
}
