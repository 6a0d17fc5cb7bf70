mod attendance;
mod client;
mod config;
mod error;
pub mod media;
mod orchestrator;
pub mod peer;
pub mod rtc;
mod signaling_sink;

pub use attendance::*;
pub use client::*;
pub use config::*;
pub use error::*;
pub use orchestrator::*;
pub use signaling_sink::*;
