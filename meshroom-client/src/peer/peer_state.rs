use meshroom_core::ParticipantId;
use std::fmt;

/// Lifecycle of the record kept for one remote participant.
///
/// `Closed` is terminal: a participant that comes back gets a fresh record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerState {
    Pending,
    Negotiating,
    Connected,
    Closed,
}

impl fmt::Display for PeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PeerState::Pending => "pending",
            PeerState::Negotiating => "negotiating",
            PeerState::Connected => "connected",
            PeerState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Sent by a peer task to its orchestrator. `generation` identifies the record
/// instance, so reports from a record that has since been replaced can be told
/// apart from those of its successor.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerReport {
    StateChanged {
        remote: ParticipantId,
        generation: u64,
        state: PeerState,
    },
    Failed {
        remote: ParticipantId,
        generation: u64,
        reason: String,
    },
}

impl PeerReport {
    pub fn remote(&self) -> &ParticipantId {
        match self {
            PeerReport::StateChanged { remote, .. } | PeerReport::Failed { remote, .. } => remote,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            PeerReport::StateChanged { generation, .. } | PeerReport::Failed { generation, .. } => {
                *generation
            }
        }
    }
}
