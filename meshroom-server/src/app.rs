use crate::config::ServerConfig;
use crate::session::SessionManager;
use crate::signaling::{SignalingService, ws_handler, ws_session_handler};
use anyhow::{Context, Result};
use axum::http::HeaderValue;
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

pub struct AppState {
    pub signaling: SignalingService,
    pub sessions: SessionManager,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let signaling = SignalingService::new(config.ice_servers.clone());
        let sessions = SessionManager::new(Arc::new(signaling.clone()), config.session_capacity);

        Self {
            signaling,
            sessions,
        }
    }
}

pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Result<Router> {
    let origin = match &config.allowed_origin {
        Some(origin) => AllowOrigin::exact(
            HeaderValue::from_str(origin)
                .with_context(|| format!("invalid allowed origin: {origin}"))?,
        ),
        None => AllowOrigin::from(Any),
    };

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/ws", get(ws_handler))
        .route("/ws/{session}", get(ws_session_handler))
        .layer(cors)
        .with_state(state))
}

/// Binds `config.bind_addr` and serves the relay until the process stops.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let state = Arc::new(AppState::new(&config));
    let app = router(state, &config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("Signaling relay listening on ws://{}/ws", config.bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
