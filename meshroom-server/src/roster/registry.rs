use meshroom_core::{ConnectionId, ErrorKind, ParticipantId};
use std::collections::{BTreeMap, HashMap};

/// Who is present in one session and which connection speaks for them.
///
/// Indexed by identifier and by connection. The two maps always hold the
/// same pairs.
#[derive(Debug, Default)]
pub struct RosterRegistry {
    by_id: BTreeMap<ParticipantId, ConnectionId>,
    by_conn: HashMap<ConnectionId, ParticipantId>,
}

impl RosterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, raw_id: &str, conn: ConnectionId) -> Result<ParticipantId, ErrorKind> {
        let id = ParticipantId::parse(raw_id)?;

        if self.by_id.contains_key(&id) {
            return Err(ErrorKind::DuplicateIdentifier);
        }
        if self.by_conn.contains_key(&conn) {
            return Err(ErrorKind::AlreadyJoined);
        }

        self.by_id.insert(id.clone(), conn);
        self.by_conn.insert(conn, id.clone());
        Ok(id)
    }

    /// Drops whichever identifier `conn` holds. Returns it, if there was one.
    pub fn unregister(&mut self, conn: &ConnectionId) -> Option<ParticipantId> {
        let id = self.by_conn.remove(conn)?;
        self.by_id.remove(&id);
        Some(id)
    }

    pub fn resolve(&self, id: &ParticipantId) -> Option<ConnectionId> {
        self.by_id.get(id).copied()
    }

    pub fn identity_of(&self, conn: &ConnectionId) -> Option<&ParticipantId> {
        self.by_conn.get(conn)
    }

    /// Current membership, sorted by identifier.
    pub fn snapshot(&self) -> Vec<ParticipantId> {
        self.by_id.keys().cloned().collect()
    }

    /// Connections of every registered participant.
    pub fn connections(&self) -> Vec<ConnectionId> {
        self.by_id.values().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
