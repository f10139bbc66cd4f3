//! The local, optimistic view of the conversation.
//!
//! Messages are only ever appended; the one destructive operation is
//! [`MessageTimeline::clear`], which belongs to the explicit history-clear
//! action. Ids keep increasing across a clear so they stay unique for the
//! whole session.

use std::slice;

use tracing::warn;

use crate::models::message::{Message, MessageId, MessagePreview, NewMessage, Role};

/// First message shown in a fresh session.
pub const GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";

#[derive(Debug, Clone)]
pub struct MessageTimeline {
    messages: Vec<Message>,
    next_id: MessageId,
}

impl Default for MessageTimeline {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageTimeline {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: MessageId::FIRST,
        }
    }

    /// A timeline holding the assistant greeting as message 1.
    pub fn with_greeting() -> Self {
        let mut timeline = Self::new();
        timeline
            .messages
            .push(Message::new(MessageId::FIRST, Role::Assistant, GREETING.to_string()));
        timeline.next_id = MessageId::FIRST.next();
        timeline
    }

    /// Append at the end and return the id the message was stored under.
    ///
    /// A preset id is kept when it is greater than every id issued so far
    /// and within [`MessageId::MAX_PRESET`]; otherwise the next sequential id
    /// is assigned.
    pub fn append(&mut self, message: NewMessage) -> MessageId {
        let id = match message.id {
            Some(requested) if requested > MessageId::MAX_PRESET => {
                warn!(
                    requested = %requested,
                    assigned = %self.next_id,
                    "preset message id is out of range; assigning next id"
                );
                self.next_id
            }
            Some(requested) if requested >= self.next_id => requested,
            Some(requested) => {
                warn!(
                    requested = %requested,
                    assigned = %self.next_id,
                    "preset message id is not increasing; assigning next id"
                );
                self.next_id
            }
            None => self.next_id,
        };
        self.next_id = id.next();
        self.messages.push(Message::new(id, message.role, message.text));
        id
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Messages in insertion order. The iterator is `Clone`, so a caller can
    /// walk it more than once.
    pub fn snapshot(&self) -> slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        // Ids are strictly increasing, so the backing vec is sorted by id.
        self.messages
            .binary_search_by_key(&id, Message::id)
            .ok()
            .map(|idx| &self.messages[idx])
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Sidebar previews of every assistant message, oldest first.
    pub fn previews(&self) -> Vec<MessagePreview> {
        self.messages
            .iter()
            .filter(|m| m.is_assistant())
            .map(MessagePreview::of)
            .collect()
    }
}
