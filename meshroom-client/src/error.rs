use meshroom_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error(transparent)]
    Kind(#[from] ErrorKind),

    #[error("signaling channel is closed")]
    Signaling,

    #[error("not joined to a session")]
    NotJoined,

    /// Error reported by the media backend, converted to text at the boundary.
    #[error("media backend: {0}")]
    Media(String),
}

impl ClientError {
    pub fn media(err: impl std::fmt::Display) -> Self {
        Self::Media(err.to_string())
    }

    pub fn negotiation(reason: impl std::fmt::Display) -> Self {
        Self::Kind(ErrorKind::negotiation(reason))
    }

    pub fn kind(&self) -> Option<&ErrorKind> {
        match self {
            Self::Kind(kind) => Some(kind),
            _ => None,
        }
    }
}
