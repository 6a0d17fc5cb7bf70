use crate::app::AppState;
use crate::session::{DEFAULT_SESSION, SessionCommand};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use meshroom_core::{ClientSignal, ConnectionId, ServerSignal};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, DEFAULT_SESSION.to_owned(), state))
}

pub async fn ws_session_handler(
    ws: WebSocketUpgrade,
    Path(session): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, session, state))
}

async fn handle_socket(socket: WebSocket, session: String, state: Arc<AppState>) {
    let conn = ConnectionId::new();
    info!("New WebSocket connection {} for session '{}'", conn, session);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let service = state.signaling.clone();
    service.add_connection(conn, tx);
    service.send_signal(
        conn,
        &ServerSignal::IceConfig {
            ice_servers: service.ice_servers(),
        },
    );

    let session_tx = state.sessions.session_sender(&session);
    if let Err(e) = session_tx.send(SessionCommand::Connect { conn }).await {
        error!("Session '{}' died: {}", session, e);
        service.remove_connection(&conn);
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let session_tx = session_tx.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientSignal>(&text) {
                        Ok(signal) => {
                            let cmd = SessionCommand::Signal { conn, signal };
                            if let Err(e) = session_tx.send(cmd).await {
                                error!("Session died: {}", e);
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid ClientSignal from {}: {:?}", conn, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    let _ = session_tx.send(SessionCommand::Disconnect { conn }).await;
    service.remove_connection(&conn);
    info!("WebSocket disconnected: {}", conn);
}
