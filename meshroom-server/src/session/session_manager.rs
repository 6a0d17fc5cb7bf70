use crate::session::{Session, SessionCommand};
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Name of the session used when a client does not pick one.
pub const DEFAULT_SESSION: &str = "main";

/// Lazily spawns one [`Session`] actor per session name.
///
/// The manager only keeps weak senders: every connection holds a strong one,
/// so a session stops once its last connection is gone and its entry is
/// removed.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<DashMap<String, mpsc::WeakSender<SessionCommand>>>,
    signaling: Arc<dyn SignalingOutput>,
    capacity: usize,
}

impl SessionManager {
    pub fn new(signaling: Arc<dyn SignalingOutput>, capacity: usize) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            signaling,
            capacity: capacity.max(1),
        }
    }

    /// Command sender of the named session, spawning the actor on first use
    /// (or again if the previous actor has stopped).
    pub fn session_sender(&self, name: &str) -> mpsc::Sender<SessionCommand> {
        match self.sessions.entry(name.to_owned()) {
            Entry::Occupied(mut entry) => {
                if let Some(tx) = entry.get().upgrade() {
                    return tx;
                }
                let tx = self.spawn_session(name);
                entry.insert(tx.downgrade());
                tx
            }
            Entry::Vacant(entry) => {
                let tx = self.spawn_session(name);
                entry.insert(tx.downgrade());
                tx
            }
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn spawn_session(&self, name: &str) -> mpsc::Sender<SessionCommand> {
        info!("Creating new session: {}", name);
        let (tx, rx) = mpsc::channel(self.capacity);

        let session = Session::new(name, rx, self.signaling.clone());
        let sessions = self.sessions.clone();
        let name = name.to_owned();

        tokio::spawn(async move {
            session.run().await;

            // A newer actor may already be registered under the same name.
            if sessions
                .remove_if(&name, |_, tx| tx.upgrade().is_none())
                .is_some()
            {
                debug!("Removed session entry: {}", name);
            }
        });

        tx
    }
}
