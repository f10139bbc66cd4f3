//! Server history reconciliation.
//!
//! The server is the only source of truth for history, so reconciliation is
//! replace-on-fetch: a successful fetch becomes the whole view, in server
//! order, even if it is shorter than what was shown before (a clear may have
//! raced the fetch). A failed fetch leaves the last good view in place.
//!
//! History is kept apart from the message timeline. The timeline holds this
//! session's optimistic messages; history holds what the server had durably
//! recorded at fetch time. The two overlap but share no ordering key, so they
//! are never merged.

use chatlink_core::models::history::HistoryEntry;
use chatlink_gateway::GatewayError;
use tracing::{info, warn};

/// The history panel's content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryView {
    entries: Option<Vec<HistoryEntry>>,
    synced_at: Option<jiff::Timestamp>,
}

impl HistoryView {
    /// `None` until the first successful fetch or clear.
    pub fn entries(&self) -> Option<&[HistoryEntry]> {
        self.entries.as_deref()
    }

    /// When the view last took a value from the server.
    pub fn synced_at(&self) -> Option<jiff::Timestamp> {
        self.synced_at
    }

    pub fn is_unset(&self) -> bool {
        self.entries.is_none()
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What a reconciliation did to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The fetch succeeded and replaced the view. `previous` is `None` when
    /// the view had never been set.
    Replaced {
        previous: Option<usize>,
        current: usize,
    },
    /// The fetch failed; the view was left as it was.
    KeptStale(GatewayError),
}

impl Reconciliation {
    pub fn is_replaced(&self) -> bool {
        matches!(self, Reconciliation::Replaced { .. })
    }

    pub fn error(&self) -> Option<&GatewayError> {
        match self {
            Reconciliation::KeptStale(e) => Some(e),
            Reconciliation::Replaced { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryReconciler;

impl HistoryReconciler {
    pub fn new() -> Self {
        Self
    }

    pub fn reconcile(
        &self,
        view: &mut HistoryView,
        fetched: Result<Vec<HistoryEntry>, GatewayError>,
    ) -> Reconciliation {
        match fetched {
            Ok(entries) => {
                let previous = view.entries.as_ref().map(Vec::len);
                let current = entries.len();

                if previous.is_some_and(|prev| current < prev) {
                    warn!(previous = ?previous, current, "server history shrank; accepting it");
                }

                view.entries = Some(entries);
                view.synced_at = Some(jiff::Timestamp::now());
                info!(entries = current, "history reconciled");

                Reconciliation::Replaced { previous, current }
            }
            Err(e) => {
                warn!(error = %e, kept = view.len(), "history fetch failed; keeping stale view");
                Reconciliation::KeptStale(e)
            }
        }
    }

    /// Reset the view after the server confirmed a clear.
    pub fn clear(&self, view: &mut HistoryView) {
        view.entries = Some(Vec::new());
        view.synced_at = Some(jiff::Timestamp::now());
    }
}
