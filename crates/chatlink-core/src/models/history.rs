use serde::{Deserialize, Serialize};

/// One full exchange as recorded by the server.
///
/// Entries are immutable snapshots; their sequence is their position in the
/// list the server returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub user: String,
    pub bot: String,
}

impl HistoryEntry {
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: bot.into(),
        }
    }
}
