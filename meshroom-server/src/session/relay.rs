use crate::roster::RosterRegistry;
use crate::signaling::SignalingOutput;
use meshroom_core::{ChatMessage, ConnectionId, NegotiationKind, ParticipantId, ServerSignal};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Delivered(ConnectionId),
    /// Target not registered; dropped. The sender self-corrects once the next
    /// snapshot no longer lists the target.
    RecipientAbsent,
    /// Target is the sender itself; dropped.
    SelfAddressed,
}

/// Forwards one negotiation message to the connection registered as `to`,
/// rewritten as `{from: sender, payload}`. The payload is never inspected.
pub async fn relay_negotiation(
    registry: &RosterRegistry,
    sender: &ParticipantId,
    kind: NegotiationKind,
    to: ParticipantId,
    payload: Value,
    out: &dyn SignalingOutput,
) -> RelayOutcome {
    let Some(target) = registry.resolve(&to) else {
        warn!(from = %sender, to = %to, %kind, "Recipient not present, dropping");
        return RelayOutcome::RecipientAbsent;
    };

    if &to == sender {
        warn!(from = %sender, %kind, "Message addressed to its own sender, dropping");
        return RelayOutcome::SelfAddressed;
    }

    debug!(from = %sender, to = %to, %kind, "Relaying");
    out.send(target, ServerSignal::relayed(kind, sender.clone(), payload))
        .await;
    RelayOutcome::Delivered(target)
}

/// Broadcasts chat text to every participant, sender included. Text and
/// timestamp are passed on unchanged; the sender is always the connection's
/// own identity.
pub async fn broadcast_chat(
    registry: &RosterRegistry,
    sender: &ParticipantId,
    mut message: ChatMessage,
    out: &dyn SignalingOutput,
) {
    if &message.sender != sender {
        debug!(
            from = %sender,
            claimed = %message.sender,
            "Chat message with foreign sender, restamping"
        );
        message.sender = sender.clone();
    }

    out.broadcast(&registry.connections(), ServerSignal::Chat(message))
        .await;
}
