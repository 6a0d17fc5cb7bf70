mod app;
mod config;
mod roster;
mod session;
mod signaling;

pub use app::*;
pub use config::*;
pub use roster::*;
pub use session::*;
pub use signaling::*;
