
pub use mock_media::*;
pub use signal_helpers::*;
