use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure taxonomy shared by the relay and the clients.
///
/// Only the join errors ever cross the wire (inside `JoinRejected`); the rest
/// stay local to the side that observed them.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ErrorKind {
    #[error("participant identifier must not be empty")]
    InvalidIdentifier,

    #[error("participant identifier is already present in the session")]
    DuplicateIdentifier,

    #[error("connection has already joined the session")]
    AlreadyJoined,

    #[error("recipient is not present in the session")]
    RecipientAbsent,

    #[error("camera or microphone could not be acquired")]
    DeviceUnavailable,

    #[error("negotiation failed: {0}")]
    NegotiationFailure(String),
}

impl ErrorKind {
    pub fn negotiation(reason: impl std::fmt::Display) -> Self {
        Self::NegotiationFailure(reason.to_string())
    }
}
