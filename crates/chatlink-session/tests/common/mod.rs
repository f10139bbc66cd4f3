//! Scripted in-memory gateway for session tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chatlink_core::models::history::HistoryEntry;
use chatlink_core::models::identity::Identity;
use chatlink_gateway::{ChatGateway, GatewayError};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Send { identity: String, text: String },
    FetchHistory { identity: String },
    ClearHistory { identity: String },
}

/// Replays queued results; falls back to a canned success when a queue is
/// empty. Optional gates hold a call until the test releases it.
#[derive(Default)]
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    histories: Mutex<VecDeque<Result<Vec<HistoryEntry>, GatewayError>>>,
    clears: Mutex<VecDeque<Result<(), GatewayError>>>,
    calls: Mutex<Vec<Call>>,
    send_gate: Option<Arc<Notify>>,
    history_gate: Option<Arc<Notify>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, result: Result<&str, GatewayError>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(result.map(str::to_string));
        self
    }

    pub fn history(self, result: Result<Vec<HistoryEntry>, GatewayError>) -> Self {
        self.histories.lock().unwrap().push_back(result);
        self
    }

    pub fn clear(self, result: Result<(), GatewayError>) -> Self {
        self.clears.lock().unwrap().push_back(result);
        self
    }

    pub fn hold_sends(mut self, gate: Arc<Notify>) -> Self {
        self.send_gate = Some(gate);
        self
    }

    pub fn hold_history(mut self, gate: Arc<Notify>) -> Self {
        self.history_gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn send_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Send { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ChatGateway for ScriptedGateway {
    async fn send_message(&self, identity: &Identity, text: &str) -> Result<String, GatewayError> {
        self.record(Call::Send {
            identity: identity.to_string(),
            text: text.to_string(),
        });
        if let Some(gate) = &self.send_gate {
            gate.notified().await;
        }
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok("ok".to_string()))
    }

    async fn fetch_history(&self, identity: &Identity) -> Result<Vec<HistoryEntry>, GatewayError> {
        self.record(Call::FetchHistory {
            identity: identity.to_string(),
        });
        if let Some(gate) = &self.history_gate {
            gate.notified().await;
        }
        let next = self.histories.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn clear_history(&self, identity: &Identity) -> Result<(), GatewayError> {
        self.record(Call::ClearHistory {
            identity: identity.to_string(),
        });
        let next = self.clears.lock().unwrap().pop_front();
        next.unwrap_or(Ok(()))
    }
}

pub fn network_failure() -> GatewayError {
    GatewayError::NetworkFailure("connection refused".to_string())
}

pub fn rejected(status: u16) -> GatewayError {
    GatewayError::ServerRejected {
        status,
        body: "nope".to_string(),
    }
}
