use async_trait::async_trait;
use meshroom_core::{ConnectionId, ServerSignal};

/// Outbound side of the relay transport. The session actor only ever talks to
/// connections through this trait, so the transport (WebSocket, test harness)
/// is swappable.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Deliver one signal to one connection. Delivery is at-most-once; a
    /// connection that is already gone is logged and skipped.
    async fn send(&self, conn: ConnectionId, signal: ServerSignal);

    async fn broadcast(&self, conns: &[ConnectionId], signal: ServerSignal) {
        for conn in conns {
            self.send(*conn, signal.clone()).await;
        }
    }
}
