use crate::config::ClientConfig;
use crate::media::{LocalTrack, MediaPathFactory};
use crate::peer::{PeerCommand, PeerHandle, PeerReport, PeerSetup, PeerState, spawn_peer};
use crate::signaling_sink::SignalingSink;
use meshroom_core::{
    ErrorKind, IceCandidate, IceServerConfig, NegotiationKind, ParticipantId, Payload, Role,
    SessionDescription,
};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Keeps exactly one peer record per remote participant of the session and
/// routes negotiation messages to them.
///
/// Records run as independent tasks, so peers negotiate concurrently while
/// each one handles its own messages strictly in order.
pub struct PeerOrchestrator<F: MediaPathFactory, S: SignalingSink> {
    local: ParticipantId,
    factory: Arc<F>,
    signaling: Arc<S>,
    offer_delay: Duration,
    ice_servers: Vec<IceServerConfig>,
    tracks: Vec<LocalTrack<F::Track>>,
    peers: HashMap<ParticipantId, PeerHandle<F::Track>>,
    next_generation: u64,
    report_tx: mpsc::UnboundedSender<PeerReport>,
    report_rx: mpsc::UnboundedReceiver<PeerReport>,
}

impl<F, S> PeerOrchestrator<F, S>
where
    F: MediaPathFactory,
    S: SignalingSink,
{
    pub fn new(
        local: ParticipantId,
        factory: Arc<F>,
        signaling: Arc<S>,
        config: &ClientConfig,
    ) -> Self {
        let (report_tx, report_rx) = mpsc::unbounded_channel();

        Self {
            local,
            factory,
            signaling,
            offer_delay: config.offer_delay,
            ice_servers: config.ice_servers.clone(),
            tracks: Vec::new(),
            peers: HashMap::new(),
            next_generation: 0,
            report_tx,
            report_rx,
        }
    }

    pub fn local_id(&self) -> &ParticipantId {
        &self.local
    }

    /// Applies to records created from now on.
    pub fn set_ice_servers(&mut self, ice_servers: Vec<IceServerConfig>) {
        self.ice_servers = ice_servers;
    }

    /// Tracks attached to every record created from now on.
    pub fn set_local_tracks(&mut self, tracks: Vec<LocalTrack<F::Track>>) {
        self.tracks = tracks;
    }

    /// Remote participants that currently have a record, sorted.
    pub fn peers(&self) -> Vec<ParticipantId> {
        let mut ids: Vec<_> = self.peers.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn peer_state(&self, remote: &ParticipantId) -> Option<PeerState> {
        self.peers.get(remote).map(PeerHandle::state)
    }

    pub fn peer_role(&self, remote: &ParticipantId) -> Option<Role> {
        self.peers.get(remote).map(PeerHandle::role)
    }

    pub fn watch_peer(&self, remote: &ParticipantId) -> Option<watch::Receiver<PeerState>> {
        self.peers.get(remote).map(|peer| peer.state.clone())
    }

    /// Reconciles the records with an authoritative membership snapshot:
    /// creates records for newcomers and closes those of departed
    /// participants.
    pub fn apply_snapshot(&mut self, participants: &[ParticipantId]) {
        let expected: BTreeSet<&ParticipantId> = participants
            .iter()
            .filter(|id| **id != self.local)
            .collect();

        let departed: Vec<ParticipantId> = self
            .peers
            .keys()
            .filter(|id| !expected.contains(id))
            .cloned()
            .collect();
        for remote in departed {
            self.close_peer(&remote);
        }

        for remote in expected {
            self.ensure_peer(remote);
        }
    }

    pub fn on_newcomer(&mut self, remote: &ParticipantId) {
        self.ensure_peer(remote);
    }

    /// An offer from an unknown participant creates its record.
    pub fn on_offer(&mut self, from: ParticipantId, payload: Value) {
        let offer = match SessionDescription::from_payload(payload) {
            Ok(offer) => offer,
            Err(e) => return self.reject_payload(&from, NegotiationKind::Offer, e),
        };

        if let Some(peer) = self.ensure_peer(&from) {
            peer.send(PeerCommand::RemoteOffer(offer));
        }
    }

    /// Answers are only meaningful to an existing record.
    pub fn on_answer(&mut self, from: ParticipantId, payload: Value) {
        let answer = match SessionDescription::from_payload(payload) {
            Ok(answer) => answer,
            Err(e) => return self.reject_payload(&from, NegotiationKind::Answer, e),
        };

        match self.peers.get(&from) {
            Some(peer) => peer.send(PeerCommand::RemoteAnswer(answer)),
            None => debug!(%from, "Ignoring answer from participant without a record"),
        }
    }

    /// A candidate may arrive before anything else from its sender; the record
    /// is created and the candidate buffered.
    pub fn on_candidate(&mut self, from: ParticipantId, payload: Value) {
        let candidate = match IceCandidate::from_payload(payload) {
            Ok(candidate) => candidate,
            Err(e) => return self.reject_payload(&from, NegotiationKind::IceCandidate, e),
        };

        if let Some(peer) = self.ensure_peer(&from) {
            peer.send(PeerCommand::RemoteCandidate(candidate));
        }
    }

    /// Removes the record and tears it down. Returns false when there was none.
    pub fn close_peer(&mut self, remote: &ParticipantId) -> bool {
        match self.peers.remove(remote) {
            Some(peer) => {
                info!(%remote, generation = peer.generation, "Closing peer record");
                peer.cancel();
                true
            }
            None => false,
        }
    }

    /// Tears down every record and waits until their media paths are closed.
    pub async fn close_all(&mut self) {
        let peers: Vec<_> = self.peers.drain().map(|(_, peer)| peer).collect();
        info!("Closing {} peer record(s)", peers.len());

        for peer in &peers {
            peer.cancel();
        }
        for peer in peers {
            if let Err(e) = peer.task.await {
                warn!("Peer task ended abnormally: {}", e);
            }
        }
    }

    /// Attaches a new local track to every record; each renegotiates.
    pub fn publish_track(&mut self, track: LocalTrack<F::Track>) {
        for peer in self.peers.values() {
            peer.send(PeerCommand::AttachTrack(track.clone()));
        }
        self.tracks.push(track);
    }

    pub fn unpublish_track(&mut self, track_id: &str) -> bool {
        let Some(index) = self.tracks.iter().position(|t| t.id == track_id) else {
            return false;
        };
        self.tracks.remove(index);

        for peer in self.peers.values() {
            peer.send(PeerCommand::DetachTrack(track_id.to_owned()));
        }
        true
    }

    pub fn renegotiate(&self, remote: &ParticipantId) -> bool {
        match self.peers.get(remote) {
            Some(peer) => {
                peer.send(PeerCommand::Renegotiate);
                true
            }
            None => false,
        }
    }

    /// Next report that concerns a current record (or the closing of a record
    /// that has been removed). Reports of replaced records are discarded.
    pub async fn next_report(&mut self) -> Option<PeerReport> {
        loop {
            let report = self.report_rx.recv().await?;
            if self.handle_report(&report) {
                return Some(report);
            }
        }
    }

    /// Applies a report. A failed record is dropped so that the next snapshot
    /// recreates it. Returns false for reports from stale records.
    pub fn handle_report(&mut self, report: &PeerReport) -> bool {
        let current = self.peers.get(report.remote()).map(PeerHandle::generation);

        match report {
            PeerReport::Failed {
                remote,
                generation,
                reason,
            } => {
                if current != Some(*generation) {
                    debug!(%remote, generation, "Discarding failure of a replaced record");
                    return false;
                }
                warn!(%remote, generation, "Dropping failed peer record: {}", reason);
                self.peers.remove(remote);
                true
            }
            PeerReport::StateChanged {
                generation, state, ..
            } => match current {
                Some(current) => current == *generation,
                None => *state == PeerState::Closed,
            },
        }
    }

    fn ensure_peer(&mut self, remote: &ParticipantId) -> Option<&PeerHandle<F::Track>> {
        if *remote == self.local {
            warn!(%remote, "Ignoring own identity as a remote participant");
            return None;
        }

        let live = self.peers.get(remote).is_some_and(|peer| !peer.is_stopped());
        if !live {
            if let Some(stale) = self.peers.remove(remote) {
                debug!(%remote, generation = stale.generation, "Replacing stopped peer record");
            }
            let peer = self.spawn(remote.clone());
            self.peers.insert(remote.clone(), peer);
        }
        self.peers.get(remote)
    }

    fn spawn(&mut self, remote: ParticipantId) -> PeerHandle<F::Track> {
        self.next_generation += 1;
        let role = Role::between(&self.local, &remote);
        info!(%remote, ?role, generation = self.next_generation, "Creating peer record");

        spawn_peer(PeerSetup {
            local: self.local.clone(),
            remote,
            generation: self.next_generation,
            offer_delay: self.offer_delay,
            ice_servers: self.ice_servers.clone(),
            tracks: self.tracks.clone(),
            factory: self.factory.clone(),
            signaling: self.signaling.clone(),
            reports: self.report_tx.clone(),
        })
    }

    fn reject_payload(&mut self, from: &ParticipantId, kind: NegotiationKind, err: ErrorKind) {
        warn!(%from, %kind, "Malformed negotiation payload: {}", err);
        self.close_peer(from);
    }
}

impl<F, S> Drop for PeerOrchestrator<F, S>
where
    F: MediaPathFactory,
    S: SignalingSink,
{
    fn drop(&mut self) {
        for peer in self.peers.values() {
            peer.cancel();
        }
    }
}
