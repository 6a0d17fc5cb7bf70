//! Media backend on top of the `webrtc` crate.

mod rtc_path;
mod sample_capture;

pub use rtc_path::*;
pub use sample_capture::*;
