use crate::client::{CallClient, ClientEvent, Presence};
use crate::error::ClientError;
use crate::media::{LocalMedia, MediaCapture, MediaPathFactory};
use crate::orchestrator::PeerOrchestrator;
use crate::signaling_sink::SignalingSink;
use meshroom_core::{ClientSignal, ErrorKind, ParticipantId};
use tracing::{info, warn};

impl<C, F, S> CallClient<C, F, S>
where
    C: MediaCapture,
    F: MediaPathFactory<Track = C::Track>,
    S: SignalingSink,
{
    /// Captures local media and asks the relay to admit `raw_id`.
    ///
    /// Nothing is sent when the identifier is blank or the devices cannot be
    /// acquired. The outcome arrives later as `Joined` or `JoinRejected`.
    pub async fn join(&mut self, raw_id: &str) -> Result<ParticipantId, ClientError> {
        if !matches!(self.presence, Presence::Idle) {
            return Err(ErrorKind::AlreadyJoined.into());
        }

        let id = ParticipantId::parse(raw_id)?;

        let tracks = self.capture.acquire().await.inspect_err(|e| {
            warn!(participant = %id, "Cannot join without local media: {}", e);
        })?;
        let mut media = LocalMedia::new(tracks);

        if let Err(e) = self.signaling.send_signal(ClientSignal::Join {
            id: id.to_string(),
        }) {
            media.release(&self.capture).await;
            return Err(e);
        }

        info!(participant = %id, "Join requested");
        self.presence = Presence::Joining {
            id: id.clone(),
            media,
        };
        Ok(id)
    }

    pub(super) fn on_join_accepted(&mut self, accepted: ParticipantId) {
        match std::mem::replace(&mut self.presence, Presence::Idle) {
            Presence::Joining { id, media } => {
                if id != accepted {
                    warn!(requested = %id, %accepted, "Relay admitted a different identifier");
                }

                let mut peers = PeerOrchestrator::new(
                    accepted.clone(),
                    self.factory.clone(),
                    self.signaling.clone(),
                    &self.config,
                );
                peers.set_local_tracks(media.tracks().to_vec());

                info!(participant = %accepted, "Joined session");
                self.presence = Presence::Joined {
                    id: accepted.clone(),
                    media,
                    peers,
                };
                self.emit(ClientEvent::Joined { id: accepted });
            }
            other => {
                warn!(%accepted, "Unexpected join acknowledgement");
                self.presence = other;
            }
        }
    }

    pub(super) async fn on_join_rejected(&mut self, error: ErrorKind, message: String) {
        match std::mem::replace(&mut self.presence, Presence::Idle) {
            Presence::Joining { id, mut media } => {
                warn!(participant = %id, "Join rejected: {}", message);
                media.release(&self.capture).await;
                self.emit(ClientEvent::JoinRejected { error });
            }
            other => {
                warn!("Unexpected join rejection: {}", message);
                self.presence = other;
            }
        }
    }
}
