use crate::error::ClientError;
use crate::media::{LocalTrack, MediaPath, MediaPathFactory, PathEvent, PathState};
use anyhow::Result;
use async_trait::async_trait;
use meshroom_core::{IceCandidate, IceServerConfig, ParticipantId, SdpKind, SessionDescription};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::{API, APIBuilder};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Builds `RTCPeerConnection`s sharing one media engine and interceptor set.
pub struct RtcPathFactory {
    api: API,
}

impl RtcPathFactory {
    pub fn new() -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        Ok(Self { api })
    }
}

#[async_trait]
impl MediaPathFactory for RtcPathFactory {
    type Track = Arc<TrackLocalStaticSample>;
    type Path = RtcPath;

    async fn create(
        &self,
        remote: &ParticipantId,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<PathEvent>,
    ) -> Result<RtcPath, ClientError> {
        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers.iter().map(rtc_ice_server).collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            self.api
                .new_peer_connection(rtc_config)
                .await
                .map_err(ClientError::media)?,
        );

        let state_tx = events.clone();
        let remote_state = remote.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let remote = remote_state.clone();

                Box::pin(async move {
                    info!(%remote, "Peer connection state changed: {}", s);
                    if let Some(state) = path_state(s) {
                        let _ = tx.send(PathEvent::StateChanged(state));
                    }
                })
            },
        ));

        let ice_tx = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx.send(PathEvent::LocalCandidate(IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_mline_index: init.sdp_mline_index,
                    username_fragment: init.username_fragment,
                }));
            })
        }));

        let negotiation_tx = events;
        peer_connection.on_negotiation_needed(Box::new(move || {
            let tx = negotiation_tx.clone();
            Box::pin(async move {
                let _ = tx.send(PathEvent::NegotiationNeeded);
            })
        }));

        Ok(RtcPath {
            remote: remote.clone(),
            peer_connection,
            senders: Mutex::new(HashMap::new()),
        })
    }
}

/// One `RTCPeerConnection` towards a remote participant.
pub struct RtcPath {
    remote: ParticipantId,
    peer_connection: Arc<RTCPeerConnection>,
    senders: Mutex<HashMap<String, Arc<RTCRtpSender>>>,
}

#[async_trait]
impl MediaPath for RtcPath {
    type Track = Arc<TrackLocalStaticSample>;

    async fn attach_track(&self, track: &LocalTrack<Self::Track>) -> Result<(), ClientError> {
        let local: Arc<dyn TrackLocal + Send + Sync> = track.track.clone();
        let sender = self
            .peer_connection
            .add_track(local)
            .await
            .map_err(ClientError::media)?;

        // RTCP has to be read for interceptors such as NACK to work.
        let rtcp_sender = sender.clone();
        tokio::spawn(async move {
            let mut buf = vec![0u8; 1500];
            while rtcp_sender.read(&mut buf).await.is_ok() {}
        });

        self.senders.lock().await.insert(track.id.clone(), sender);
        Ok(())
    }

    async fn detach_track(&self, track_id: &str) -> Result<(), ClientError> {
        let Some(sender) = self.senders.lock().await.remove(track_id) else {
            return Ok(());
        };
        self.peer_connection
            .remove_track(&sender)
            .await
            .map_err(ClientError::media)
    }

    async fn create_offer(&self) -> Result<SessionDescription, ClientError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(ClientError::negotiation)?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription, ClientError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(ClientError::negotiation)?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), ClientError> {
        self.peer_connection
            .set_local_description(rtc_description(desc)?)
            .await
            .map_err(ClientError::negotiation)
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), ClientError> {
        self.peer_connection
            .set_remote_description(rtc_description(desc)?)
            .await
            .map_err(ClientError::negotiation)
    }

    async fn rollback(&self) -> Result<(), ClientError> {
        let Some(pending) = self.peer_connection.pending_local_description().await else {
            return Ok(());
        };

        // An empty SDP is rejected for every type but offer/answer, so the
        // rollback carries the offer it abandons.
        let rollback: RTCSessionDescription = serde_json::from_value(serde_json::json!({
            "type": "rollback",
            "sdp": pending.sdp,
        }))
        .map_err(ClientError::negotiation)?;
        self.peer_connection
            .set_local_description(rollback)
            .await
            .map_err(ClientError::negotiation)
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), ClientError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_mline_index,
            username_fragment: candidate.username_fragment,
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .map_err(ClientError::media)
    }

    async fn close(&self) -> Result<(), ClientError> {
        self.senders.lock().await.clear();
        debug!(remote = %self.remote, "Closing peer connection");
        self.peer_connection
            .close()
            .await
            .map_err(ClientError::media)
    }
}

fn rtc_ice_server(server: &IceServerConfig) -> RTCIceServer {
    RTCIceServer {
        urls: server.urls.clone(),
        username: server.username.clone().unwrap_or_default(),
        credential: server.credential.clone().unwrap_or_default(),
        ..Default::default()
    }
}

fn rtc_description(desc: SessionDescription) -> Result<RTCSessionDescription, ClientError> {
    match desc.kind {
        SdpKind::Offer => RTCSessionDescription::offer(desc.sdp),
        SdpKind::Answer => RTCSessionDescription::answer(desc.sdp),
    }
    .map_err(ClientError::negotiation)
}

fn path_state(state: RTCPeerConnectionState) -> Option<PathState> {
    match state {
        RTCPeerConnectionState::New => Some(PathState::New),
        RTCPeerConnectionState::Connecting => Some(PathState::Connecting),
        RTCPeerConnectionState::Connected => Some(PathState::Connected),
        RTCPeerConnectionState::Disconnected => Some(PathState::Disconnected),
        RTCPeerConnectionState::Failed => Some(PathState::Failed),
        RTCPeerConnectionState::Closed => Some(PathState::Closed),
        RTCPeerConnectionState::Unspecified => None,
    }
}
