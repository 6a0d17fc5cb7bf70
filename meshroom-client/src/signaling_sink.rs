use crate::error::ClientError;
use meshroom_core::ClientSignal;
use tokio::sync::mpsc;

/// Outgoing half of the relay connection as seen by the client.
pub trait SignalingSink: Send + Sync + 'static {
    fn send_signal(&self, signal: ClientSignal) -> Result<(), ClientError>;
}

impl SignalingSink for mpsc::UnboundedSender<ClientSignal> {
    fn send_signal(&self, signal: ClientSignal) -> Result<(), ClientError> {
        self.send(signal).map_err(|_| ClientError::Signaling)
    }
}
