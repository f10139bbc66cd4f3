//! Session orchestration.
//!
//! A send cycle goes Idle → Sending → Idle:
//!
//! 1. The trimmed text is appended to the timeline as a user message and
//!    `pending` is set. Further sends are refused until the cycle ends.
//! 2. `send_message` and `fetch_history` are dispatched together. Each result
//!    is applied as soon as it arrives; neither depends on the other.
//! 3. A reply appends an assistant message. A failed send appends nothing and
//!    keeps the user message. If `clear_history` emptied the timeline while
//!    the send was in flight, the reply is dropped so it never appears
//!    without its user message.
//! 4. The history result goes through the [`HistoryReconciler`].
//! 5. `pending` is cleared once both calls have finished.
//!
//! Session state sits behind a mutex that is only held for synchronous
//! mutations, never across an `.await`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chatlink_core::models::history::HistoryEntry;
use chatlink_core::models::identity::Identity;
use chatlink_core::models::message::{Message, MessageId, MessagePreview, NewMessage};
use chatlink_core::timeline::MessageTimeline;
use chatlink_gateway::{ChatGateway, GatewayError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{InvalidIntent, SessionError};
use crate::reconciler::{HistoryReconciler, HistoryView, Reconciliation};
use crate::view::SessionView;

/// Outcome of one send cycle. The send and the history fetch are reported
/// separately because they fail independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendCycleReport {
    pub user_message: MessageId,
    /// Id of the appended assistant message, or why the send failed.
    /// `Ok(None)` when the timeline was cleared while the reply was in
    /// flight and the reply was dropped.
    pub reply: Result<Option<MessageId>, GatewayError>,
    pub history: Reconciliation,
}

impl SendCycleReport {
    pub fn is_success(&self) -> bool {
        self.reply.is_ok() && self.history.is_replaced()
    }
}

#[derive(Debug)]
struct Session {
    identity: Option<Identity>,
    timeline: MessageTimeline,
    history: HistoryView,
    pending: bool,
    /// Bumped by every successful clear. A reply is only appended if its
    /// user message belongs to the current epoch.
    epoch: u64,
}

impl Session {
    fn view(&self) -> SessionView {
        SessionView {
            identity: self.identity.clone(),
            timeline: self.timeline.snapshot().cloned().collect(),
            history: self.history.entries().map(<[HistoryEntry]>::to_vec),
            synced_at: self.history.synced_at(),
            pending: self.pending,
        }
    }
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    // A panic while holding the lock cannot leave the session half-written:
    // every mutation is a single push, clear or flag flip.
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears `pending` when the send cycle ends, including when the cycle's
/// future is dropped before completion.
struct PendingGuard<'a> {
    session: &'a Mutex<Session>,
    updates: &'a watch::Sender<SessionView>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut session = lock(self.session);
        session.pending = false;
        self.updates.send_replace(session.view());
    }
}

pub struct SessionController<G> {
    gateway: G,
    reconciler: HistoryReconciler,
    session: Mutex<Session>,
    updates: watch::Sender<SessionView>,
}

impl<G: ChatGateway> SessionController<G> {
    /// A session whose timeline starts with the assistant greeting.
    pub fn new(gateway: G) -> Self {
        Self::with_timeline(gateway, MessageTimeline::with_greeting())
    }

    pub fn with_timeline(gateway: G, timeline: MessageTimeline) -> Self {
        let session = Session {
            identity: None,
            timeline,
            history: HistoryView::default(),
            pending: false,
            epoch: 0,
        };
        let (updates, _) = watch::channel(session.view());
        Self {
            gateway,
            reconciler: HistoryReconciler::new(),
            session: Mutex::new(session),
            updates,
        }
    }

    fn publish(&self, session: &Session) {
        self.updates.send_replace(session.view());
    }

    // ── Intents ──────────────────────────────────────────────────────────────

    /// Resolve the session identity. The first non-blank value wins; later
    /// calls return `false` and change nothing.
    pub fn set_identity(&self, value: &str) -> bool {
        let Ok(identity) = Identity::parse(value) else {
            debug!("ignoring blank identity");
            return false;
        };

        let mut session = lock(&self.session);
        if session.identity.is_some() {
            debug!("identity already resolved; ignoring");
            return false;
        }
        info!(identity = %identity, "session identity resolved");
        session.identity = Some(identity);
        self.publish(&session);
        true
    }

    /// Run one send cycle for `text`.
    ///
    /// Refused with [`InvalidIntent`] (nothing mutated, gateway not called)
    /// when the text is blank, no identity is set, or a cycle is already in
    /// flight.
    pub async fn submit_message(&self, text: &str) -> Result<SendCycleReport, InvalidIntent> {
        let text = text.trim();
        debug!(chars = text.chars().count(), "submit requested");
        let message = NewMessage::user(text).map_err(|_| InvalidIntent::EmptyText)?;

        let (identity, user_message, epoch) = {
            let mut session = lock(&self.session);
            let identity = session
                .identity
                .clone()
                .ok_or(InvalidIntent::MissingIdentity)?;
            if session.pending {
                debug!("send already in flight; ignoring");
                return Err(InvalidIntent::SendInFlight);
            }
            let id = session.timeline.append(message);
            session.pending = true;
            self.publish(&session);
            (identity, id, session.epoch)
        };

        let pending = PendingGuard {
            session: &self.session,
            updates: &self.updates,
        };

        let send = async {
            let result = self.gateway.send_message(&identity, text).await;
            self.apply_reply(result, epoch)
        };
        let fetch = async {
            let result = self.gateway.fetch_history(&identity).await;
            self.apply_history(result)
        };
        let (reply, history) = tokio::join!(send, fetch);

        drop(pending);

        info!(
            user_message = %user_message,
            reply_ok = reply.is_ok(),
            history_ok = history.is_replaced(),
            "send cycle complete"
        );

        Ok(SendCycleReport {
            user_message,
            reply,
            history,
        })
    }

    /// Clear the server history, then the local history view and timeline.
    ///
    /// Not gated by `pending`. On failure nothing changes locally and the
    /// call can simply be repeated.
    pub async fn clear_history(&self) -> Result<(), SessionError> {
        let identity = self.require_identity()?;

        if let Err(e) = self.gateway.clear_history(&identity).await {
            warn!(error = %e, "clearing history failed");
            return Err(SessionError::Gateway(e));
        }

        let mut session = lock(&self.session);
        self.reconciler.clear(&mut session.history);
        session.timeline.clear();
        session.epoch = session.epoch.wrapping_add(1);
        self.publish(&session);
        info!("history cleared");
        Ok(())
    }

    /// Fetch and reconcile history outside of a send cycle.
    pub async fn refresh_history(&self) -> Result<Reconciliation, InvalidIntent> {
        let identity = self.require_identity()?;
        let result = self.gateway.fetch_history(&identity).await;
        Ok(self.apply_history(result))
    }

    // ── Observation ──────────────────────────────────────────────────────────

    pub fn view(&self) -> SessionView {
        lock(&self.session).view()
    }

    /// Receive a fresh [`SessionView`] after every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.updates.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.session).pending
    }

    pub fn identity(&self) -> Option<Identity> {
        lock(&self.session).identity.clone()
    }

    pub fn timeline(&self) -> Vec<Message> {
        lock(&self.session).timeline.snapshot().cloned().collect()
    }

    pub fn history(&self) -> HistoryView {
        lock(&self.session).history.clone()
    }

    pub fn previews(&self) -> Vec<MessagePreview> {
        lock(&self.session).timeline.previews()
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn require_identity(&self) -> Result<Identity, InvalidIntent> {
        lock(&self.session)
            .identity
            .clone()
            .ok_or(InvalidIntent::MissingIdentity)
    }

    fn apply_reply(
        &self,
        result: Result<String, GatewayError>,
        epoch: u64,
    ) -> Result<Option<MessageId>, GatewayError> {
        match result {
            Ok(text) => {
                let mut session = lock(&self.session);
                if session.epoch != epoch {
                    debug!("timeline cleared while the reply was in flight; dropping reply");
                    return Ok(None);
                }
                let id = session.timeline.append(NewMessage::assistant_reply(text));
                self.publish(&session);
                debug!(message_id = %id, "assistant reply appended");
                Ok(Some(id))
            }
            Err(e) => {
                warn!(error = %e, kind = %e.kind(), "send failed; keeping user message");
                Err(e)
            }
        }
    }

    fn apply_history(&self, result: Result<Vec<HistoryEntry>, GatewayError>) -> Reconciliation {
        let mut session = lock(&self.session);
        let outcome = self.reconciler.reconcile(&mut session.history, result);
        if outcome.is_replaced() {
            self.publish(&session);
        }
        outcome
    }
}
