mod local_media;
mod local_track;
mod media_path;

pub use local_media::*;
pub use local_track::*;
pub use media_path::*;
