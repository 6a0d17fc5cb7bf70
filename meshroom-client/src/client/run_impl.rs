use crate::client::{CallClient, ClientEvent, Presence};
use crate::error::ClientError;
use crate::media::{MediaCapture, MediaPathFactory};
use crate::peer::PeerReport;
use crate::signaling_sink::SignalingSink;
use meshroom_core::ServerSignal;
use tokio::sync::mpsc;
use tracing::info;

impl<C, F, S> CallClient<C, F, S>
where
    C: MediaCapture,
    F: MediaPathFactory<Track = C::Track>,
    S: SignalingSink,
{
    /// Drives the client from the relay's signal stream until it ends, then
    /// leaves the session.
    pub async fn run(
        &mut self,
        incoming: &mut mpsc::UnboundedReceiver<ServerSignal>,
    ) -> Result<(), ClientError> {
        loop {
            tokio::select! {
                signal = incoming.recv() => match signal {
                    Some(signal) => self.handle_signal(signal).await?,
                    None => break,
                },
                Some(report) = self.next_peer_report() => self.on_peer_report(report),
            }
        }

        info!("Signal stream ended");
        if !matches!(self.presence, Presence::Idle) {
            self.leave().await?;
        }
        Ok(())
    }

    /// Waits for the next relevant report of a peer record. Never resolves
    /// while not joined.
    pub async fn next_peer_report(&mut self) -> Option<PeerReport> {
        match self.orchestrator_mut() {
            Some(peers) => peers.next_report().await,
            None => std::future::pending().await,
        }
    }

    pub fn on_peer_report(&mut self, report: PeerReport) {
        if let PeerReport::StateChanged { remote, state, .. } = report {
            self.emit(ClientEvent::PeerStateChanged { remote, state });
        }
    }
}
