use crate::error::ClientError;
use crate::media::LocalTrack;
use async_trait::async_trait;
use meshroom_core::{IceCandidate, IceServerConfig, ParticipantId, SessionDescription};
use tokio::sync::mpsc;

/// Connectivity of one media path as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Things a media path reports on its own initiative.
#[derive(Debug, Clone, PartialEq)]
pub enum PathEvent {
    LocalCandidate(IceCandidate),
    StateChanged(PathState),
    NegotiationNeeded,
}

/// Source of the local participant's captured media.
#[async_trait]
pub trait MediaCapture: Send + Sync + 'static {
    type Track: Clone + Send + Sync + 'static;

    /// Fails with `DeviceUnavailable` when capture cannot start.
    async fn acquire(&self) -> Result<Vec<LocalTrack<Self::Track>>, ClientError>;

    /// Stops the devices behind `tracks`.
    async fn release(&self, tracks: Vec<LocalTrack<Self::Track>>);
}

/// One direct media connection towards a remote participant.
#[async_trait]
pub trait MediaPath: Send + Sync + 'static {
    type Track: Clone + Send + Sync + 'static;

    async fn attach_track(&self, track: &LocalTrack<Self::Track>) -> Result<(), ClientError>;
    async fn detach_track(&self, track_id: &str) -> Result<(), ClientError>;

    async fn create_offer(&self) -> Result<SessionDescription, ClientError>;
    async fn create_answer(&self) -> Result<SessionDescription, ClientError>;
    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), ClientError>;
    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), ClientError>;

    /// Abandons an outstanding local offer, returning to the stable phase.
    async fn rollback(&self) -> Result<(), ClientError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), ClientError>;
    async fn close(&self) -> Result<(), ClientError>;
}

#[async_trait]
pub trait MediaPathFactory: Send + Sync + 'static {
    type Track: Clone + Send + Sync + 'static;
    type Path: MediaPath<Track = Self::Track>;

    /// Opens a path towards `remote`. Candidates, state changes and
    /// renegotiation needs are reported on `events` for the path's lifetime.
    async fn create(
        &self,
        remote: &ParticipantId,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<PathEvent>,
    ) -> Result<Self::Path, ClientError>;
}
