//! Message records for the customer/support thread.
//!
//! The thread is append-only and persisted as a JSON array under the
//! `messages` key, oldest first.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::inline::InlineImage;

/// Opaque unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Creates a new time-ordered message identifier.
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

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The customer using the portal.
    Customer,
    /// The support team.
    Support,
}

impl Sender {
    /// Display label for the sender.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Customer => "You",
            Self::Support => "Support",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Support => write!(f, "support"),
        }
    }
}

impl std::str::FromStr for Sender {
    type Err = UnknownSender;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "support" => Ok(Self::Support),
            _ => Err(UnknownSender(s.to_string())),
        }
    }
}

/// Returned when parsing a [`Sender`] from an unrecognised string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sender '{0}' (expected 'customer' or 'support')")]
pub struct UnknownSender(pub String);

/// One entry in the conversation thread.
///
/// At least one of `text` and `image` is expected to be present; the store
/// enforces this on append, but records read from storage are taken as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// Message body.
    #[serde(default)]
    pub text: Option<String>,
    /// Optional attached photo.
    #[serde(default)]
    pub image: Option<InlineImage>,
    /// Who sent it.
    pub sender: Sender,
    /// RFC 3339 creation time, lexicographically sortable.
    pub timestamp: String,
}

impl Message {
    /// Creates a message with a fresh identifier.
    #[must_use]
    pub fn new(
        text: Option<String>,
        image: Option<InlineImage>,
        sender: Sender,
        timestamp: String,
    ) -> Self {
        Self {
            id: MessageId::new(),
            text,
            image,
            sender,
            timestamp,
        }
    }

    /// Whether the message carries an image.
    #[must_use]
    pub const fn has_image(&self) -> bool {
        self.image.is_some()
    }
}
