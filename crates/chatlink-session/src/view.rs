use chatlink_core::models::history::HistoryEntry;
use chatlink_core::models::identity::Identity;
use chatlink_core::models::message::{Message, MessagePreview};
use serde::Serialize;

/// Read-only copy of everything a presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub identity: Option<Identity>,
    pub timeline: Vec<Message>,
    pub history: Option<Vec<HistoryEntry>>,
    pub synced_at: Option<jiff::Timestamp>,
    /// True while a send cycle is in flight; drives the typing indicator.
    pub pending: bool,
}

impl SessionView {
    pub fn previews(&self) -> Vec<MessagePreview> {
        self.timeline
            .iter()
            .filter(|m| m.is_assistant())
            .map(MessagePreview::of)
            .collect()
    }
}
