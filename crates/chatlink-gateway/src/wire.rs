//! JSON bodies exchanged with the chat server.
//!
//! The server keys the user by `email`; history comes back as `{user, bot}`
//! pairs, the only shape accepted here.

use chatlink_core::models::history::HistoryEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct SendRequest<'a> {
    pub email: &'a str,
    pub message: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct IdentityRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendResponse {
    #[serde(default)]
    pub chat_response: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryResponse {
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
}
