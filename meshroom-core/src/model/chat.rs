use crate::model::participant::ParticipantId;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Free-form text shared with the whole session. Not part of the negotiation
/// protocol; it only rides the same relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: ParticipantId,
    pub text: String,
    pub timestamp_ms: u64,
}

impl ChatMessage {
    /// Stamps the message with the current wall-clock time.
    pub fn now(sender: ParticipantId, text: impl Into<String>) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(epoch_millis)
            .unwrap_or_default();

        Self {
            sender,
            text: text.into(),
            timestamp_ms,
        }
    }
}

/// Saturates instead of wrapping.
fn epoch_millis(since_epoch: Duration) -> u64 {
    u64::try_from(since_epoch.as_millis()).unwrap_or(u64::MAX)
}
