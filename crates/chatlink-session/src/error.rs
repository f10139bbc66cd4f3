use chatlink_gateway::GatewayError;
use thiserror::Error;

/// Why an intent was refused before anything was mutated or sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidIntent {
    #[error("message text is empty")]
    EmptyText,

    #[error("no identity has been set for this session")]
    MissingIdentity,

    #[error("a message is already being sent")]
    SendInFlight,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("intent refused: {0}")]
    InvalidIntent(#[from] InvalidIntent),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
