use crate::client::{CallClient, Presence};
use crate::error::ClientError;
use crate::media::{LocalTrack, MediaCapture, MediaKind, MediaPathFactory};
use crate::signaling_sink::SignalingSink;
use meshroom_core::{ChatMessage, ClientSignal};

impl<C, F, S> CallClient<C, F, S>
where
    C: MediaCapture,
    F: MediaPathFactory<Track = C::Track>,
    S: SignalingSink,
{
    /// Mutes or unmutes the microphone for every peer at once.
    pub fn set_audio_enabled(&mut self, enabled: bool) -> Result<(), ClientError> {
        self.set_enabled(MediaKind::Audio, enabled)
    }

    pub fn set_video_enabled(&mut self, enabled: bool) -> Result<(), ClientError> {
        self.set_enabled(MediaKind::Video, enabled)
    }

    fn set_enabled(&mut self, kind: MediaKind, enabled: bool) -> Result<(), ClientError> {
        let media = self.media_mut().ok_or(ClientError::NotJoined)?;
        media.set_enabled(kind, enabled);
        Ok(())
    }

    /// Adds a track (e.g. a screen share) and renegotiates with every peer.
    pub fn publish_track(&mut self, track: LocalTrack<F::Track>) -> Result<(), ClientError> {
        match &mut self.presence {
            Presence::Idle => Err(ClientError::NotJoined),
            Presence::Joining { media, .. } => {
                media.add_track(track);
                Ok(())
            }
            Presence::Joined { media, peers, .. } => {
                media.add_track(track.clone());
                peers.publish_track(track);
                Ok(())
            }
        }
    }

    pub fn unpublish_track(&mut self, track_id: &str) -> Result<bool, ClientError> {
        match &mut self.presence {
            Presence::Idle => Err(ClientError::NotJoined),
            Presence::Joining { media, .. } => Ok(media.remove_track(track_id).is_some()),
            Presence::Joined { media, peers, .. } => {
                let removed = media.remove_track(track_id).is_some();
                peers.unpublish_track(track_id);
                Ok(removed)
            }
        }
    }

    /// Sends chat text to the whole session. Blank text is not sent and
    /// yields `Ok(false)`.
    pub fn send_chat(&self, text: &str) -> Result<bool, ClientError> {
        let Presence::Joined { id, .. } = &self.presence else {
            return Err(ClientError::NotJoined);
        };

        if text.trim().is_empty() {
            return Ok(false);
        }

        self.signaling
            .send_signal(ClientSignal::Chat(ChatMessage::now(id.clone(), text)))?;
        Ok(true)
    }
}
