use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("server rejected request (status {status}): {body}")]
    ServerRejected { status: u16, body: String },

    #[error("gateway config error: {0}")]
    Config(String),
}

/// Coarse classification of a [`GatewayError`], for callers that only need
/// to branch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    NetworkFailure,
    ServerRejected,
    Misconfigured,
}

impl GatewayError {
    pub fn kind(&self) -> GatewayErrorKind {
        match self {
            GatewayError::NetworkFailure(_) => GatewayErrorKind::NetworkFailure,
            GatewayError::ServerRejected { .. } => GatewayErrorKind::ServerRejected,
            GatewayError::Config(_) => GatewayErrorKind::Misconfigured,
        }
    }
}

impl fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GatewayErrorKind::NetworkFailure => "network_failure",
            GatewayErrorKind::ServerRejected => "server_rejected",
            GatewayErrorKind::Misconfigured => "misconfigured",
        };
        f.write_str(label)
    }
}
