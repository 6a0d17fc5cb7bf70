use crate::roster::RosterRegistry;
use crate::signaling::SignalingOutput;
use meshroom_core::{ConnectionId, ErrorKind, ParticipantId, ServerSignal};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Lifecycle of one relay connection. A connection that has left has no entry
/// at all, so nothing can be delivered to it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceState {
    Connected,
    Joined(ParticipantId),
}

/// Owns the roster of a session and is the only thing that mutates it.
pub struct PresenceCoordinator {
    registry: RosterRegistry,
    connections: HashMap<ConnectionId, PresenceState>,
}

impl PresenceCoordinator {
    pub fn new(registry: RosterRegistry) -> Self {
        Self {
            registry,
            connections: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &RosterRegistry {
        &self.registry
    }

    pub fn state(&self, conn: &ConnectionId) -> Option<&PresenceState> {
        self.connections.get(conn)
    }

    pub fn joined_identity(&self, conn: &ConnectionId) -> Option<&ParticipantId> {
        match self.connections.get(conn) {
            Some(PresenceState::Joined(id)) => Some(id),
            _ => None,
        }
    }

    pub fn connect(&mut self, conn: ConnectionId) {
        self.connections.entry(conn).or_insert(PresenceState::Connected);
        debug!(%conn, "Connection entered session");
    }

    /// Registers `raw_id` for `conn`. The joiner gets an explicit answer; on
    /// success everybody (joiner included) gets the new snapshot and the
    /// existing participants additionally get a newcomer notice.
    pub async fn join(
        &mut self,
        conn: ConnectionId,
        raw_id: &str,
        out: &dyn SignalingOutput,
    ) -> Result<ParticipantId, ErrorKind> {
        let state = self
            .connections
            .entry(conn)
            .or_insert(PresenceState::Connected);

        let result = match state {
            PresenceState::Joined(_) => Err(ErrorKind::AlreadyJoined),
            PresenceState::Connected => self.registry.register(raw_id, conn),
        };

        let id = match result {
            Ok(id) => id,
            Err(e) => {
                warn!(%conn, requested = raw_id, "Join rejected: {}", e);
                out.send(conn, ServerSignal::rejected(e.clone())).await;
                return Err(e);
            }
        };

        self.connections
            .insert(conn, PresenceState::Joined(id.clone()));
        info!(%conn, participant = %id, "Participant joined ({} present)", self.registry.len());

        out.send(conn, ServerSignal::JoinAccepted { id: id.clone() })
            .await;
        self.broadcast_snapshot(out).await;

        let others: Vec<ConnectionId> = self
            .registry
            .connections()
            .into_iter()
            .filter(|c| *c != conn)
            .collect();
        out.broadcast(&others, ServerSignal::NewParticipant { id: id.clone() })
            .await;

        Ok(id)
    }

    /// Forgets `conn`. If it had joined, its identifier is released and the
    /// remaining participants get the updated snapshot.
    pub async fn disconnect(
        &mut self,
        conn: ConnectionId,
        out: &dyn SignalingOutput,
    ) -> Option<ParticipantId> {
        match self.connections.remove(&conn) {
            Some(PresenceState::Joined(id)) => {
                self.registry.unregister(&conn);
                info!(%conn, participant = %id, "Participant left ({} present)", self.registry.len());
                self.broadcast_snapshot(out).await;
                Some(id)
            }
            Some(PresenceState::Connected) => {
                debug!(%conn, "Connection left before joining");
                None
            }
            None => None,
        }
    }

    async fn broadcast_snapshot(&self, out: &dyn SignalingOutput) {
        let snapshot = ServerSignal::Participants {
            ids: self.registry.snapshot(),
        };
        out.broadcast(&self.registry.connections(), snapshot).await;
    }
}
