use crate::media::LocalTrack;
use meshroom_core::{IceCandidate, SessionDescription};

/// Inbox of a peer task. Commands are processed one at a time, in order.
#[derive(Debug, Clone)]
pub enum PeerCommand<T> {
    RemoteOffer(SessionDescription),
    RemoteAnswer(SessionDescription),
    RemoteCandidate(IceCandidate),
    AttachTrack(LocalTrack<T>),
    DetachTrack(String),
    Renegotiate,
}
