use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-supplied identity of a participant, unique within a session.
///
/// Ordering is the byte-wise lexicographic order of the underlying string,
/// which is also the tie-break used to pick the negotiation initiator.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Validates a raw identifier. Empty and whitespace-only values are rejected.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ErrorKind> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ErrorKind::InvalidIdentifier);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Role this participant takes towards `remote`.
    pub fn role_towards(&self, remote: &ParticipantId) -> Role {
        Role::between(self, remote)
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = ErrorKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for ParticipantId {
    type Error = ErrorKind;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}

impl AsRef<str> for ParticipantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Side a participant plays in the handshake with one remote participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Initiator,
    Responder,
}

impl Role {
    /// The smaller identifier initiates. Total and symmetric: for `a != b`
    /// exactly one of `between(a, b)` and `between(b, a)` is `Initiator`.
    pub fn between(local: &ParticipantId, remote: &ParticipantId) -> Self {
        if local.as_str().as_bytes() < remote.as_str().as_bytes() {
            Role::Initiator
        } else {
            Role::Responder
        }
    }

    pub fn is_initiator(self) -> bool {
        matches!(self, Role::Initiator)
    }
}
