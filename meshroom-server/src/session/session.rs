use crate::roster::RosterRegistry;
use crate::session::presence::PresenceCoordinator;
use crate::session::relay::{broadcast_chat, relay_negotiation};
use crate::session::session_command::SessionCommand;
use crate::signaling::SignalingOutput;
use meshroom_core::{ChatMessage, ClientSignal, ConnectionId, NegotiationKind, ParticipantId};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Actor owning one session: its roster, its connections and the relay
/// between them.
///
/// Commands are handled strictly one at a time in arrival order, so registry
/// mutations never interleave with each other or with relay lookups.
pub struct Session {
    name: String,
    presence: PresenceCoordinator,
    command_rx: mpsc::Receiver<SessionCommand>,
    signaling: Arc<dyn SignalingOutput>,
}

impl Session {
    pub fn new(
        name: impl Into<String>,
        command_rx: mpsc::Receiver<SessionCommand>,
        signaling: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            name: name.into(),
            presence: PresenceCoordinator::new(RosterRegistry::new()),
            command_rx,
            signaling,
        }
    }

    pub async fn run(mut self) {
        info!(session = %self.name, "Session event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!(session = %self.name, "Command channel closed. Shutting down session.");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Connect { conn } => self.presence.connect(conn),

            SessionCommand::Signal { conn, signal } => self.handle_signal(conn, signal).await,

            SessionCommand::Disconnect { conn } => {
                self.presence
                    .disconnect(conn, self.signaling.as_ref())
                    .await;
            }
        }
    }

    async fn handle_signal(&mut self, conn: ConnectionId, signal: ClientSignal) {
        match signal {
            ClientSignal::Join { id } => {
                let _ = self
                    .presence
                    .join(conn, &id, self.signaling.as_ref())
                    .await;
            }
            ClientSignal::Offer { to, payload } => {
                self.relay(conn, NegotiationKind::Offer, to, payload).await
            }
            ClientSignal::Answer { to, payload } => {
                self.relay(conn, NegotiationKind::Answer, to, payload).await
            }
            ClientSignal::IceCandidate { to, payload } => {
                self.relay(conn, NegotiationKind::IceCandidate, to, payload)
                    .await
            }
            ClientSignal::Chat(message) => self.chat(conn, message).await,
        }
    }

    async fn relay(&self, conn: ConnectionId, kind: NegotiationKind, to: ParticipantId, payload: Value) {
        let Some(sender) = self.presence.joined_identity(&conn) else {
            debug!(%conn, %kind, "Ignoring message from connection that has not joined");
            return;
        };

        relay_negotiation(
            self.presence.registry(),
            sender,
            kind,
            to,
            payload,
            self.signaling.as_ref(),
        )
        .await;
    }

    async fn chat(&self, conn: ConnectionId, message: ChatMessage) {
        let Some(sender) = self.presence.joined_identity(&conn) else {
            debug!(%conn, "Ignoring chat from connection that has not joined");
            return;
        };

        broadcast_chat(
            self.presence.registry(),
            sender,
            message,
            self.signaling.as_ref(),
        )
        .await;
    }
}
