use crate::error::ErrorKind;
use crate::model::chat::ChatMessage;
use crate::model::negotiation::NegotiationKind;
use crate::model::participant::ParticipantId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(urls: &[&str]) -> Self {
        Self {
            urls: urls.iter().map(|u| (*u).to_owned()).collect(),
            username: None,
            credential: None,
        }
    }
}

/// Messages a participant sends to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ClientSignal {
    /// Raw identifier; validated by the relay so an empty one can be rejected
    /// with an answer instead of a parse failure.
    Join { id: String },
    Offer { to: ParticipantId, payload: Value },
    Answer { to: ParticipantId, payload: Value },
    IceCandidate { to: ParticipantId, payload: Value },
    Chat(ChatMessage),
}

impl ClientSignal {
    pub fn negotiation(kind: NegotiationKind, to: ParticipantId, payload: Value) -> Self {
        match kind {
            NegotiationKind::Offer => ClientSignal::Offer { to, payload },
            NegotiationKind::Answer => ClientSignal::Answer { to, payload },
            NegotiationKind::IceCandidate => ClientSignal::IceCandidate { to, payload },
        }
    }
}

/// Messages the relay sends to a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ServerSignal {
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    JoinAccepted {
        id: ParticipantId,
    },
    JoinRejected {
        error: ErrorKind,
        message: String,
    },
    /// Full membership snapshot; order carries no meaning.
    Participants {
        ids: Vec<ParticipantId>,
    },
    NewParticipant {
        id: ParticipantId,
    },
    Offer {
        from: ParticipantId,
        payload: Value,
    },
    Answer {
        from: ParticipantId,
        payload: Value,
    },
    IceCandidate {
        from: ParticipantId,
        payload: Value,
    },
    Chat(ChatMessage),
}

impl ServerSignal {
    pub fn relayed(kind: NegotiationKind, from: ParticipantId, payload: Value) -> Self {
        match kind {
            NegotiationKind::Offer => ServerSignal::Offer { from, payload },
            NegotiationKind::Answer => ServerSignal::Answer { from, payload },
            NegotiationKind::IceCandidate => ServerSignal::IceCandidate { from, payload },
        }
    }

    pub fn rejected(error: ErrorKind) -> Self {
        ServerSignal::JoinRejected {
            message: error.to_string(),
            error,
        }
    }
}
