use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Shown in place of an assistant reply that came back blank.
pub const FALLBACK_REPLY: &str = "I couldn't process your request.";

/// Number of characters kept in a sidebar preview before it is ellipsized.
pub const PREVIEW_CHARS: usize = 50;

/// Session-unique, strictly increasing message identifier. Starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl MessageId {
    pub const FIRST: MessageId = MessageId(1);

    /// Highest id a caller may preset. Everything above is left for
    /// sequential assignment so the counter can never run out.
    pub const MAX_PRESET: MessageId = MessageId(u64::MAX >> 1);

    /// The following id. Saturates at `u64::MAX` instead of wrapping.
    pub fn next(self) -> MessageId {
        MessageId(self.0.saturating_add(1))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// A message that has been appended to a timeline.
///
/// Fields are private: once a message is in the timeline its id, role and
/// text never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    text: String,
    created_at: jiff::Timestamp,
}

impl Message {
    pub(crate) fn new(id: MessageId, role: Role, text: String) -> Self {
        Self {
            id,
            role,
            text,
            created_at: jiff::Timestamp::now(),
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> jiff::Timestamp {
        self.created_at
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// Input to [`MessageTimeline::append`](crate::timeline::MessageTimeline::append).
///
/// The text is validated as non-blank on construction, so appending never
/// fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub(crate) id: Option<MessageId>,
    pub(crate) role: Role,
    pub(crate) text: String,
}

impl NewMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Result<Self, CoreError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CoreError::BlankText);
        }
        Ok(Self {
            id: None,
            role,
            text,
        })
    }

    pub fn user(text: impl Into<String>) -> Result<Self, CoreError> {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Result<Self, CoreError> {
        Self::new(Role::Assistant, text)
    }

    /// An assistant reply, substituting [`FALLBACK_REPLY`] for blank text.
    pub fn assistant_reply(text: impl Into<String>) -> Self {
        let text = text.into();
        let text = if text.trim().is_empty() {
            FALLBACK_REPLY.to_string()
        } else {
            text
        };
        Self {
            id: None,
            role: Role::Assistant,
            text,
        }
    }

    /// Request a specific id. The timeline honours it only if it is greater
    /// than every id it has already issued and no higher than
    /// [`MessageId::MAX_PRESET`].
    pub fn with_id(mut self, id: MessageId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Sidebar summary of an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePreview {
    pub id: MessageId,
    pub created_at: jiff::Timestamp,
    pub preview: String,
}

impl MessagePreview {
    pub fn of(message: &Message) -> Self {
        Self {
            id: message.id,
            created_at: message.created_at,
            preview: truncate_preview(&message.text, PREVIEW_CHARS),
        }
    }
}

/// Keep the first `max_chars` characters, appending `...` if anything was cut.
fn truncate_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

