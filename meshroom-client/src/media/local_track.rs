use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// A captured track together with its on/off switch.
///
/// Clones share the switch, so every media path the track is attached to sees
/// the same enabled state.
#[derive(Debug, Clone)]
pub struct LocalTrack<T> {
    pub id: String,
    pub kind: MediaKind,
    pub track: T,
    enabled: Arc<AtomicBool>,
}

impl<T> LocalTrack<T> {
    pub fn new(id: impl Into<String>, kind: MediaKind, track: T) -> Self {
        Self {
            id: id.into(),
            kind,
            track,
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }
}
