//! chatlink-session
//!
//! Drives one user's conversation: optimistic appends, the send cycle,
//! replace-on-fetch history reconciliation, and history clearing.

pub mod controller;
pub mod error;
pub mod reconciler;
pub mod view;

pub use controller::{SendCycleReport, SessionController};
pub use error::{InvalidIntent, SessionError};
pub use reconciler::{HistoryReconciler, HistoryView, Reconciliation};
pub use view::SessionView;
