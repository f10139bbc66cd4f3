//! chatlink-gateway
//!
//! Boundary adapter to the remote assistant service. Stateless: every call
//! is one outbound request with an explicit success or [`GatewayError`].

pub mod client;
pub mod error;
pub mod gateway;
pub mod http;
mod wire;

pub use client::{Endpoints, GatewayConfig};
pub use error::{GatewayError, GatewayErrorKind};
pub use gateway::ChatGateway;
pub use http::HttpChatGateway;
