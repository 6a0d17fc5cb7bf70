use anyhow::{Context, Result};
use meshroom_core::IceServerConfig;
use meshroom_core::utils::default_ice_servers;
use std::env;
use std::net::SocketAddr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_SESSION_CAPACITY: usize = 256;

/// Runtime settings of the relay server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// STUN/TURN servers advertised to every client on connect.
    pub ice_servers: Vec<IceServerConfig>,
    /// Bound of each session's command queue.
    pub session_capacity: usize,
    /// Single origin allowed by CORS; any origin when unset.
    pub allowed_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            ice_servers: default_ice_servers(),
            session_capacity: DEFAULT_SESSION_CAPACITY,
            allowed_origin: None,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `MESHROOM_BIND`, `MESHROOM_ALLOWED_ORIGIN` and
    /// `TURN_URL` / `TURN_USERNAME` / `TURN_CREDENTIAL`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(bind) = env::var("MESHROOM_BIND") {
            config.bind_addr = bind
                .parse()
                .with_context(|| format!("MESHROOM_BIND is not a socket address: {bind}"))?;
        }

        if let Ok(origin) = env::var("MESHROOM_ALLOWED_ORIGIN") {
            config.allowed_origin = Some(origin);
        }

        if let Ok(turn_url) = env::var("TURN_URL") {
            config.ice_servers.push(IceServerConfig {
                urls: vec![turn_url],
                username: env::var("TURN_USERNAME").ok(),
                credential: env::var("TURN_CREDENTIAL").ok(),
            });
        }

        Ok(config)
    }
}
