//! chatlink-core
//!
//! Pure domain types and the local message timeline.
//! No network dependency. This is the shared vocabulary of the ChatLink client.

pub mod error;
pub mod models;
pub mod timeline;
