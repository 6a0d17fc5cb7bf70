pub use meshroom_core::{ErrorKind, ParticipantId, Role};

pub mod model {
    pub use meshroom_core::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use meshroom_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use meshroom_client::*;
}
