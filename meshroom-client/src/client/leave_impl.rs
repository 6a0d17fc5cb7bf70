use crate::client::{CallClient, ClientEvent, Presence};
use crate::error::ClientError;
use crate::media::{MediaCapture, MediaPathFactory};
use crate::signaling_sink::SignalingSink;
use tracing::info;

impl<C, F, S> CallClient<C, F, S>
where
    C: MediaCapture,
    F: MediaPathFactory<Track = C::Track>,
    S: SignalingSink,
{
    /// Closes every peer record, then stops the capture devices.
    pub async fn leave(&mut self) -> Result<(), ClientError> {
        let mut media = match std::mem::replace(&mut self.presence, Presence::Idle) {
            Presence::Idle => return Err(ClientError::NotJoined),
            Presence::Joining { media, .. } => media,
            Presence::Joined {
                id,
                media,
                mut peers,
            } => {
                info!(participant = %id, "Leaving session");
                peers.close_all().await;
                media
            }
        };

        media.release(&self.capture).await;
        self.roster.clear();
        self.emit(ClientEvent::Left);
        Ok(())
    }
}
