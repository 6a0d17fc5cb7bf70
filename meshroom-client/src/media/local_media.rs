use crate::media::{LocalTrack, MediaCapture, MediaKind};
use tracing::{debug, info};

/// Captured media of the local participant, shared by every peer record.
pub struct LocalMedia<T> {
    tracks: Vec<LocalTrack<T>>,
    audio_enabled: bool,
    video_enabled: bool,
    released: bool,
}

impl<T: Clone> LocalMedia<T> {
    pub fn new(tracks: Vec<LocalTrack<T>>) -> Self {
        Self {
            tracks,
            audio_enabled: true,
            video_enabled: true,
            released: false,
        }
    }

    pub fn tracks(&self) -> &[LocalTrack<T>] {
        &self.tracks
    }

    pub fn is_enabled(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Audio => self.audio_enabled,
            MediaKind::Video => self.video_enabled,
        }
    }

    /// Flips every track of `kind`. Paths keep their tracks attached, so no
    /// renegotiation takes place.
    pub fn set_enabled(&mut self, kind: MediaKind, enabled: bool) {
        match kind {
            MediaKind::Audio => self.audio_enabled = enabled,
            MediaKind::Video => self.video_enabled = enabled,
        }

        for track in self.tracks.iter().filter(|t| t.kind == kind) {
            track.set_enabled(enabled);
        }
        debug!("Local {} {}", kind, if enabled { "enabled" } else { "disabled" });
    }

    /// Adds a track, inheriting the current on/off state of its kind.
    pub fn add_track(&mut self, track: LocalTrack<T>) {
        track.set_enabled(self.is_enabled(track.kind));
        self.tracks.push(track);
    }

    pub fn remove_track(&mut self, track_id: &str) -> Option<LocalTrack<T>> {
        let index = self.tracks.iter().position(|t| t.id == track_id)?;
        Some(self.tracks.remove(index))
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Stops the capture devices. Only the first call reaches `capture`.
    pub async fn release<C>(&mut self, capture: &C) -> bool
    where
        C: MediaCapture<Track = T>,
    {
        if self.released {
            return false;
        }
        self.released = true;

        let tracks = std::mem::take(&mut self.tracks);
        info!("Releasing {} local track(s)", tracks.len());
        capture.release(tracks).await;
        true
    }
}
