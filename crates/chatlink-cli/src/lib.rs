//! chatlink-cli library root.
//!
//! Exposes the config, rendering and REPL modules so integration tests can
//! exercise them without going through the binary.

pub mod config;
pub mod render;
pub mod repl;
