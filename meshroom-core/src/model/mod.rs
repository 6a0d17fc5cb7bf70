mod chat;
mod connection;
mod negotiation;
mod participant;
mod signaling;

pub use chat::ChatMessage;
pub use connection::ConnectionId;
pub use negotiation::{IceCandidate, NegotiationKind, Payload, SdpKind, SessionDescription};
pub use participant::{ParticipantId, Role};
pub use signaling::{ClientSignal, IceServerConfig, ServerSignal};
