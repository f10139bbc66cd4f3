use std::future::Future;
use std::sync::Arc;

use chatlink_core::models::history::HistoryEntry;
use chatlink_core::models::identity::Identity;

use crate::error::GatewayError;

/// The three remote operations a chat session needs.
///
/// Implementations issue exactly one request per call, never retry, and
/// convert every failure into a [`GatewayError`]. They must not hold any
/// session state.
pub trait ChatGateway: Send + Sync {
    /// Send `text` on behalf of `identity` and return the assistant's reply.
    ///
    /// A reply the server left out comes back as an empty string; choosing a
    /// fallback is up to the caller.
    fn send_message(
        &self,
        identity: &Identity,
        text: &str,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;

    /// Fetch the server-recorded history, in server order.
    fn fetch_history(
        &self,
        identity: &Identity,
    ) -> impl Future<Output = Result<Vec<HistoryEntry>, GatewayError>> + Send;

    /// Delete the server-recorded history. Clearing an already empty history
    /// succeeds.
    fn clear_history(
        &self,
        identity: &Identity,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

impl<G: ChatGateway> ChatGateway for Arc<G> {
    fn send_message(
        &self,
        identity: &Identity,
        text: &str,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send {
        (**self).send_message(identity, text)
    }

    fn fetch_history(
        &self,
        identity: &Identity,
    ) -> impl Future<Output = Result<Vec<HistoryEntry>, GatewayError>> + Send {
        (**self).fetch_history(identity)
    }

    fn clear_history(
        &self,
        identity: &Identity,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        (**self).clear_history(identity)
    }
}
