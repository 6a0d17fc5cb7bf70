use crate::error::ClientError;
use crate::media::{LocalTrack, MediaPath, MediaPathFactory, PathEvent, PathState};
use crate::peer::{PeerCommand, PeerHandle, PeerReport, PeerState};
use crate::signaling_sink::SignalingSink;
use meshroom_core::{
    ClientSignal, IceCandidate, IceServerConfig, NegotiationKind, ParticipantId, Payload, Role,
    SdpKind, SessionDescription,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Everything a peer task is started with.
pub(crate) struct PeerSetup<F: MediaPathFactory, S> {
    pub local: ParticipantId,
    pub remote: ParticipantId,
    pub generation: u64,
    pub offer_delay: Duration,
    pub ice_servers: Vec<IceServerConfig>,
    pub tracks: Vec<LocalTrack<F::Track>>,
    pub factory: Arc<F>,
    pub signaling: Arc<S>,
    pub reports: mpsc::UnboundedSender<PeerReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalingPhase {
    Stable,
    HaveLocalOffer,
}

/// Why the task left its loop early.
enum Interrupt {
    Cancelled,
    Failed(ClientError),
}

impl From<ClientError> for Interrupt {
    fn from(err: ClientError) -> Self {
        Interrupt::Failed(err)
    }
}

pub(crate) fn spawn_peer<F, S>(setup: PeerSetup<F, S>) -> PeerHandle<F::Track>
where
    F: MediaPathFactory,
    S: SignalingSink,
{
    let (commands, inbox) = mpsc::unbounded_channel();
    let (state_tx, state) = watch::channel(PeerState::Pending);
    let cancel = CancellationToken::new();
    let role = Role::between(&setup.local, &setup.remote);
    let generation = setup.generation;

    let task = tokio::spawn(run_peer(setup, inbox, state_tx, cancel.clone()));

    PeerHandle {
        role,
        generation,
        commands,
        state,
        cancel,
        task,
    }
}

async fn run_peer<F, S>(
    setup: PeerSetup<F, S>,
    inbox: mpsc::UnboundedReceiver<PeerCommand<F::Track>>,
    state_tx: watch::Sender<PeerState>,
    cancel: CancellationToken,
) where
    F: MediaPathFactory,
    S: SignalingSink,
{
    let PeerSetup {
        local,
        remote,
        generation,
        offer_delay,
        ice_servers,
        tracks,
        factory,
        signaling,
        reports,
    } = setup;

    let _ = reports.send(PeerReport::StateChanged {
        remote: remote.clone(),
        generation,
        state: PeerState::Pending,
    });

    let (event_tx, path_events) = mpsc::unbounded_channel();
    let created = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        res = factory.create(&remote, &ice_servers, event_tx) => Some(res),
    };

    let path = match created {
        Some(Ok(path)) => path,
        Some(Err(e)) => {
            warn!(%remote, generation, "Failed to open media path: {}", e);
            state_tx.send_replace(PeerState::Closed);
            let _ = reports.send(PeerReport::Failed {
                remote,
                generation,
                reason: e.to_string(),
            });
            return;
        }
        None => {
            state_tx.send_replace(PeerState::Closed);
            return;
        }
    };

    let mut task = PeerTask {
        role: Role::between(&local, &remote),
        remote,
        generation,
        offer_delay,
        path,
        signaling,
        inbox,
        path_events,
        reports,
        state_tx,
        cancel,
        phase: SignalingPhase::Stable,
        remote_description_set: false,
        pending_candidates: Vec::new(),
        attached: Vec::new(),
        path_connected: false,
        negotiated: false,
        offer_wanted: false,
        offer_deadline: None,
    };

    let outcome = task.run(tracks).await;
    task.teardown().await;

    if let Err(Interrupt::Failed(e)) = outcome {
        warn!(remote = %task.remote, generation, "Negotiation failed: {}", e);
        task.report(PeerReport::Failed {
            remote: task.remote.clone(),
            generation,
            reason: e.to_string(),
        });
    }
}

/// Negotiation state machine for one remote participant. Owns the media path;
/// nothing else touches it.
struct PeerTask<P: MediaPath, S> {
    role: Role,
    remote: ParticipantId,
    generation: u64,
    offer_delay: Duration,
    path: P,
    signaling: Arc<S>,
    inbox: mpsc::UnboundedReceiver<PeerCommand<P::Track>>,
    path_events: mpsc::UnboundedReceiver<PathEvent>,
    reports: mpsc::UnboundedSender<PeerReport>,
    state_tx: watch::Sender<PeerState>,
    cancel: CancellationToken,

    phase: SignalingPhase,
    remote_description_set: bool,
    /// Remote candidates received before any remote description, in arrival order.
    pending_candidates: Vec<IceCandidate>,
    attached: Vec<LocalTrack<P::Track>>,
    path_connected: bool,
    /// At least one offer/answer exchange has completed.
    negotiated: bool,
    offer_wanted: bool,
    offer_deadline: Option<Instant>,
}

impl<P, S> PeerTask<P, S>
where
    P: MediaPath,
    S: SignalingSink,
{
    async fn run(&mut self, tracks: Vec<LocalTrack<P::Track>>) -> Result<(), Interrupt> {
        for track in tracks {
            self.attach(track).await?;
        }

        if self.role.is_initiator() {
            self.schedule_offer();
        }

        loop {
            let deadline = self.offer_deadline;

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(Interrupt::Cancelled),

                cmd = self.inbox.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await?,
                    None => return Ok(()),
                },

                Some(event) = self.path_events.recv() => self.handle_path_event(event)?,

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.offer_deadline = None;
                    self.make_offer().await?;
                }
            }
        }
    }

    /// Awaits one backend operation unless the record is torn down first, in
    /// which case the operation's result is discarded.
    async fn step<T>(
        &self,
        op: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<T, Interrupt> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Interrupt::Cancelled),
            res = op => res.map_err(Interrupt::Failed),
        }
    }

    async fn handle_command(&mut self, cmd: PeerCommand<P::Track>) -> Result<(), Interrupt> {
        match cmd {
            PeerCommand::RemoteOffer(desc) => self.on_remote_offer(desc).await,
            PeerCommand::RemoteAnswer(desc) => self.on_remote_answer(desc).await,
            PeerCommand::RemoteCandidate(candidate) => self.on_remote_candidate(candidate).await,
            PeerCommand::AttachTrack(track) => {
                self.attach(track).await?;
                self.schedule_offer();
                Ok(())
            }
            PeerCommand::DetachTrack(track_id) => {
                self.detach(&track_id).await?;
                self.schedule_offer();
                Ok(())
            }
            PeerCommand::Renegotiate => {
                self.schedule_offer();
                Ok(())
            }
        }
    }

    fn handle_path_event(&mut self, event: PathEvent) -> Result<(), Interrupt> {
        match event {
            PathEvent::LocalCandidate(candidate) => {
                self.send(NegotiationKind::IceCandidate, &candidate)
            }
            PathEvent::NegotiationNeeded => {
                self.schedule_offer();
                Ok(())
            }
            PathEvent::StateChanged(state) => self.on_path_state(state),
        }
    }

    fn on_path_state(&mut self, state: PathState) -> Result<(), Interrupt> {
        debug!(remote = %self.remote, ?state, "Media path state changed");

        match state {
            PathState::Connected => {
                self.path_connected = true;
                self.refresh_connected();
                Ok(())
            }
            PathState::Disconnected => {
                // The backend may still recover; the record stays, but it is
                // no longer reported as connected.
                self.path_connected = false;
                if *self.state_tx.borrow() == PeerState::Connected {
                    self.set_state(PeerState::Negotiating);
                }
                Ok(())
            }
            PathState::Failed => Err(ClientError::negotiation("media path failed").into()),
            PathState::Closed => {
                Err(ClientError::negotiation("media path closed unexpectedly").into())
            }
            PathState::New | PathState::Connecting => Ok(()),
        }
    }

    /// Requests an offer after the debounce delay. A responder never sends the
    /// first offer of a pair.
    fn schedule_offer(&mut self) {
        if !self.role.is_initiator() && !self.negotiated {
            return;
        }

        self.offer_wanted = true;
        if self.negotiated {
            self.set_state(PeerState::Pending);
        }
        if self.offer_deadline.is_none() {
            self.offer_deadline = Some(Instant::now() + self.offer_delay);
        }
    }

    async fn make_offer(&mut self) -> Result<(), Interrupt> {
        if !self.offer_wanted {
            return Ok(());
        }
        if self.phase != SignalingPhase::Stable {
            debug!(remote = %self.remote, "Offer already outstanding, deferring");
            return Ok(());
        }
        self.offer_wanted = false;

        self.set_state(PeerState::Negotiating);
        let offer = self.step(self.path.create_offer()).await?;
        self.step(self.path.set_local_description(offer.clone()))
            .await?;
        self.phase = SignalingPhase::HaveLocalOffer;

        info!(remote = %self.remote, "Sending offer");
        self.send(NegotiationKind::Offer, &offer)
    }

    async fn on_remote_offer(&mut self, offer: SessionDescription) -> Result<(), Interrupt> {
        if offer.kind != SdpKind::Offer {
            return Err(ClientError::negotiation("offer message carries an answer").into());
        }

        if self.phase == SignalingPhase::HaveLocalOffer {
            if self.role.is_initiator() {
                debug!(remote = %self.remote, "Ignoring colliding offer, ours stands");
                return Ok(());
            }

            debug!(remote = %self.remote, "Colliding offer, rolling back ours");
            self.step(self.path.rollback()).await?;
            self.phase = SignalingPhase::Stable;
            self.offer_wanted = true;
        } else if !self.negotiated {
            self.offer_wanted = false;
            self.offer_deadline = None;
        }

        self.set_state(PeerState::Negotiating);
        self.step(self.path.set_remote_description(offer)).await?;
        self.remote_description_set = true;
        self.flush_candidates().await?;

        let answer = self.step(self.path.create_answer()).await?;
        self.step(self.path.set_local_description(answer.clone()))
            .await?;

        info!(remote = %self.remote, "Sending answer");
        self.send(NegotiationKind::Answer, &answer)?;
        self.on_negotiation_complete();
        Ok(())
    }

    async fn on_remote_answer(&mut self, answer: SessionDescription) -> Result<(), Interrupt> {
        if self.phase != SignalingPhase::HaveLocalOffer {
            debug!(remote = %self.remote, "Ignoring answer without an outstanding offer");
            return Ok(());
        }
        if answer.kind != SdpKind::Answer {
            return Err(ClientError::negotiation("answer message carries an offer").into());
        }

        self.step(self.path.set_remote_description(answer)).await?;
        self.phase = SignalingPhase::Stable;
        self.remote_description_set = true;
        self.flush_candidates().await?;

        self.on_negotiation_complete();
        Ok(())
    }

    async fn on_remote_candidate(&mut self, candidate: IceCandidate) -> Result<(), Interrupt> {
        if !self.remote_description_set {
            self.pending_candidates.push(candidate);
            debug!(
                remote = %self.remote,
                "Buffered ICE candidate ({} pending)",
                self.pending_candidates.len()
            );
            return Ok(());
        }

        self.apply_candidate(candidate).await
    }

    async fn flush_candidates(&mut self) -> Result<(), Interrupt> {
        let pending = std::mem::take(&mut self.pending_candidates);
        if !pending.is_empty() {
            debug!(remote = %self.remote, "Applying {} buffered candidate(s)", pending.len());
        }

        for candidate in pending {
            self.apply_candidate(candidate).await?;
        }
        Ok(())
    }

    /// A candidate the backend rejects is skipped; the path may still connect
    /// through the others.
    async fn apply_candidate(&mut self, candidate: IceCandidate) -> Result<(), Interrupt> {
        match self.step(self.path.add_ice_candidate(candidate)).await {
            Ok(()) => Ok(()),
            Err(Interrupt::Failed(e)) => {
                warn!(remote = %self.remote, "Failed to apply ICE candidate: {}", e);
                Ok(())
            }
            Err(interrupt) => Err(interrupt),
        }
    }

    fn on_negotiation_complete(&mut self) {
        self.negotiated = true;
        self.refresh_connected();

        if self.offer_wanted {
            self.offer_wanted = false;
            self.schedule_offer();
        }
    }

    fn refresh_connected(&mut self) {
        if self.path_connected
            && self.remote_description_set
            && self.phase == SignalingPhase::Stable
        {
            self.set_state(PeerState::Connected);
        }
    }

    async fn attach(&mut self, track: LocalTrack<P::Track>) -> Result<(), Interrupt> {
        if self.attached.iter().any(|t| t.id == track.id) {
            return Ok(());
        }

        self.step(self.path.attach_track(&track)).await?;
        debug!(remote = %self.remote, track = %track.id, "Attached {} track", track.kind);
        self.attached.push(track);
        Ok(())
    }

    async fn detach(&mut self, track_id: &str) -> Result<(), Interrupt> {
        let Some(index) = self.attached.iter().position(|t| t.id == track_id) else {
            return Ok(());
        };

        self.step(self.path.detach_track(track_id)).await?;
        self.attached.remove(index);
        Ok(())
    }

    fn send<T: Payload>(&self, kind: NegotiationKind, body: &T) -> Result<(), Interrupt> {
        let payload = body.to_payload().map_err(ClientError::from)?;
        self.signaling
            .send_signal(ClientSignal::negotiation(kind, self.remote.clone(), payload))?;
        Ok(())
    }

    fn set_state(&mut self, state: PeerState) {
        if *self.state_tx.borrow() == state {
            return;
        }

        self.state_tx.send_replace(state);
        debug!(remote = %self.remote, generation = self.generation, %state, "Peer state");
        self.report(PeerReport::StateChanged {
            remote: self.remote.clone(),
            generation: self.generation,
            state,
        });
    }

    fn report(&self, report: PeerReport) {
        let _ = self.reports.send(report);
    }

    /// Releases the path and everything attached to it. Runs exactly once, on
    /// every exit.
    async fn teardown(&mut self) {
        for track in std::mem::take(&mut self.attached) {
            if let Err(e) = self.path.detach_track(&track.id).await {
                debug!(remote = %self.remote, track = %track.id, "Detach during teardown failed: {}", e);
            }
        }

        self.pending_candidates.clear();
        self.offer_deadline = None;

        if let Err(e) = self.path.close().await {
            warn!(remote = %self.remote, "Error closing media path: {}", e);
        }

        self.set_state(PeerState::Closed);
        info!(remote = %self.remote, generation = self.generation, "Peer record closed");
    }
}
