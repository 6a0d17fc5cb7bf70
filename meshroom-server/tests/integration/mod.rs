
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Level;

use meshroom_server::{Session, SessionCommand};

use crate::utils::{MockSignalingOutput, TestSession};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn create_test_session() -> TestSession {
    let (cmd_tx, cmd_rx) = mpsc::channel::<SessionCommand>(100);
    let (signaling, signal_rx) = MockSignalingOutput::new();

    let session = Session::new("test", cmd_rx, Arc::new(signaling.clone()));

    tokio::spawn(async move {
        session.run().await;
    });

    TestSession::new(cmd_tx, signaling, signal_rx)
}
