//! Plain-text rendering of session state for the terminal.

use chatlink_core::models::history::HistoryEntry;
use chatlink_core::models::message::{Message, MessageId, MessagePreview, Role};
use chatlink_gateway::{GatewayError, GatewayErrorKind};
use chatlink_session::SessionView;

pub const TYPING_INDICATOR: &str = "AI is typing...";

pub fn format_message(message: &Message) -> String {
    match message.role() {
        Role::User => format!("You: {}", message.text()),
        Role::Assistant => format!("AI: {}", message.text()),
    }
}

/// The history panel. `None` means history has not been fetched yet.
pub fn format_history(entries: Option<&[HistoryEntry]>) -> String {
    match entries {
        None => "History not loaded yet.".to_string(),
        Some([]) => "No chat history.".to_string(),
        Some(entries) => entries
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("{}. You: {}\n   AI: {}", i + 1, entry.user, entry.bot))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn format_previews(previews: &[MessagePreview]) -> String {
    if previews.is_empty() {
        return "No sessions yet.".to_string();
    }
    previews
        .iter()
        .map(|p| {
            let time = p.created_at.strftime("%H:%M");
            format!("[{time}] #{} {}", p.id, p.preview)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_send_failure(error: &GatewayError) -> String {
    match error.kind() {
        GatewayErrorKind::NetworkFailure => {
            format!("Could not reach the assistant ({error}). Your message was kept.")
        }
        GatewayErrorKind::ServerRejected => {
            format!("The assistant rejected the request ({error}). Your message was kept.")
        }
        GatewayErrorKind::Misconfigured => format!("Gateway misconfigured: {error}"),
    }
}

/// Turns successive [`SessionView`]s into the lines that are new since the
/// last call.
///
/// User messages are not echoed since the user just typed them. The typing
/// indicator is shown once per rising edge of `pending`.
#[derive(Debug, Default)]
pub struct Printer {
    last_shown: Option<MessageId>,
    typing: bool,
}

impl Printer {
    pub fn render(&mut self, view: &SessionView) -> Vec<String> {
        let mut lines = Vec::new();

        if view.pending && !self.typing {
            lines.push(TYPING_INDICATOR.to_string());
        }
        self.typing = view.pending;

        for message in &view.timeline {
            if Some(message.id()) <= self.last_shown {
                continue;
            }
            if message.is_assistant() {
                lines.push(format_message(message));
            }
            self.last_shown = Some(message.id());
        }

        lines
    }
}
