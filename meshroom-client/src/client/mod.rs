use crate::attendance::render_attendance;
use crate::config::ClientConfig;
use crate::media::{LocalMedia, MediaCapture, MediaKind, MediaPathFactory};
use crate::orchestrator::PeerOrchestrator;
use crate::peer::PeerState;
use crate::signaling_sink::SignalingSink;
use meshroom_core::{ChatMessage, ErrorKind, IceServerConfig, ParticipantId};
use std::sync::Arc;
use tokio::sync::mpsc;

mod controls_impl;
mod handle_signal_impl;
mod join_impl;
mod leave_impl;
mod run_impl;

/// What the local participant's client tells the user interface.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Joined { id: ParticipantId },
    JoinRejected { error: ErrorKind },
    RosterChanged { participants: Vec<ParticipantId> },
    PeerStateChanged { remote: ParticipantId, state: PeerState },
    Chat(ChatMessage),
    Left,
}

enum Presence<F: MediaPathFactory, S: SignalingSink> {
    Idle,
    /// Join sent, waiting for the relay's answer. Media is already captured.
    Joining {
        id: ParticipantId,
        media: LocalMedia<F::Track>,
    },
    Joined {
        id: ParticipantId,
        media: LocalMedia<F::Track>,
        peers: PeerOrchestrator<F, S>,
    },
}

/// Client of one local participant: captures media, joins a session through
/// the relay and keeps a media path open to every other participant.
pub struct CallClient<C, F, S>
where
    C: MediaCapture,
    F: MediaPathFactory<Track = C::Track>,
    S: SignalingSink,
{
    capture: C,
    factory: Arc<F>,
    signaling: Arc<S>,
    config: ClientConfig,
    presence: Presence<F, S>,
    roster: Vec<ParticipantId>,
    events: mpsc::UnboundedSender<ClientEvent>,
}

impl<C, F, S> CallClient<C, F, S>
where
    C: MediaCapture,
    F: MediaPathFactory<Track = C::Track>,
    S: SignalingSink,
{
    pub fn new(
        capture: C,
        factory: F,
        signaling: S,
        config: ClientConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();

        let client = Self {
            capture,
            factory: Arc::new(factory),
            signaling: Arc::new(signaling),
            config,
            presence: Presence::Idle,
            roster: Vec::new(),
            events,
        };
        (client, events_rx)
    }

    pub fn local_id(&self) -> Option<&ParticipantId> {
        match &self.presence {
            Presence::Idle => None,
            Presence::Joining { id, .. } | Presence::Joined { id, .. } => Some(id),
        }
    }

    pub fn is_joined(&self) -> bool {
        matches!(self.presence, Presence::Joined { .. })
    }

    /// Last membership snapshot received, local participant included.
    pub fn roster(&self) -> &[ParticipantId] {
        &self.roster
    }

    pub fn ice_servers(&self) -> &[IceServerConfig] {
        &self.config.ice_servers
    }

    pub fn peers(&self) -> Vec<ParticipantId> {
        self.orchestrator()
            .map(PeerOrchestrator::peers)
            .unwrap_or_default()
    }

    pub fn peer_state(&self, remote: &ParticipantId) -> Option<PeerState> {
        self.orchestrator()?.peer_state(remote)
    }

    pub fn is_enabled(&self, kind: MediaKind) -> bool {
        self.media().is_some_and(|media| media.is_enabled(kind))
    }

    /// The current roster as a plain-text attendance document.
    pub fn attendance(&self) -> String {
        render_attendance(&self.roster)
    }

    pub fn orchestrator(&self) -> Option<&PeerOrchestrator<F, S>> {
        match &self.presence {
            Presence::Joined { peers, .. } => Some(peers),
            _ => None,
        }
    }

    fn orchestrator_mut(&mut self) -> Option<&mut PeerOrchestrator<F, S>> {
        match &mut self.presence {
            Presence::Joined { peers, .. } => Some(peers),
            _ => None,
        }
    }

    fn media(&self) -> Option<&LocalMedia<F::Track>> {
        match &self.presence {
            Presence::Idle => None,
            Presence::Joining { media, .. } | Presence::Joined { media, .. } => Some(media),
        }
    }

    fn media_mut(&mut self) -> Option<&mut LocalMedia<F::Track>> {
        match &mut self.presence {
            Presence::Idle => None,
            Presence::Joining { media, .. } | Presence::Joined { media, .. } => Some(media),
        }
    }

    fn emit(&self, event: ClientEvent) {
        let _ = self.events.send(event);
    }
}
