use crate::client::{CallClient, ClientEvent};
use crate::error::ClientError;
use crate::media::{MediaCapture, MediaPathFactory};
use crate::signaling_sink::SignalingSink;
use meshroom_core::ServerSignal;
use tracing::debug;

impl<C, F, S> CallClient<C, F, S>
where
    C: MediaCapture,
    F: MediaPathFactory<Track = C::Track>,
    S: SignalingSink,
{
    pub async fn handle_signal(&mut self, signal: ServerSignal) -> Result<(), ClientError> {
        match signal {
            ServerSignal::IceConfig { ice_servers } => {
                if ice_servers.is_empty() {
                    return Ok(());
                }
                debug!("Relay advertised {} ICE server(s)", ice_servers.len());
                if let Some(peers) = self.orchestrator_mut() {
                    peers.set_ice_servers(ice_servers.clone());
                }
                self.config.ice_servers = ice_servers;
            }

            ServerSignal::JoinAccepted { id } => self.on_join_accepted(id),

            ServerSignal::JoinRejected { error, message } => {
                self.on_join_rejected(error, message).await
            }

            ServerSignal::Participants { ids } => {
                let Some(peers) = self.orchestrator_mut() else {
                    debug!("Ignoring snapshot before join");
                    return Ok(());
                };
                peers.apply_snapshot(&ids);
                self.roster = ids.clone();
                self.emit(ClientEvent::RosterChanged { participants: ids });
            }

            ServerSignal::NewParticipant { id } => {
                if let Some(peers) = self.orchestrator_mut() {
                    peers.on_newcomer(&id);
                }
            }

            ServerSignal::Offer { from, payload } => {
                if let Some(peers) = self.orchestrator_mut() {
                    peers.on_offer(from, payload);
                }
            }

            ServerSignal::Answer { from, payload } => {
                if let Some(peers) = self.orchestrator_mut() {
                    peers.on_answer(from, payload);
                }
            }

            ServerSignal::IceCandidate { from, payload } => {
                if let Some(peers) = self.orchestrator_mut() {
                    peers.on_candidate(from, payload);
                }
            }

            ServerSignal::Chat(message) => self.emit(ClientEvent::Chat(message)),
        }

        Ok(())
    }
}
