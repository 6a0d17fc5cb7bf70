mod peer_command;
mod peer_handle;
mod peer_state;
mod peer_task;

pub use peer_command::*;
pub use peer_handle::*;
pub use peer_state::*;
pub(crate) use peer_task::{PeerSetup, spawn_peer};
