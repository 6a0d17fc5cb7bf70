use meshroom_core::IceServerConfig;
use meshroom_core::utils::default_ice_servers;
use std::time::Duration;

/// Delay between a peer appearing and the initiator sending its offer.
pub const DEFAULT_OFFER_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Debounce before an initiator (re)negotiates. Lets several roster
    /// changes or track changes collapse into one offer.
    pub offer_delay: Duration,
    /// Used until the relay advertises its own ICE servers.
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            offer_delay: DEFAULT_OFFER_DELAY,
            ice_servers: default_ice_servers(),
        }
    }
}

impl ClientConfig {
    pub fn with_offer_delay(mut self, offer_delay: Duration) -> Self {
        self.offer_delay = offer_delay;
        self
    }
}
