use crate::error::ClientError;
use crate::media::{LocalTrack, MediaCapture, MediaKind};
use async_trait::async_trait;
use meshroom_core::ErrorKind;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

pub type SampleTrack = LocalTrack<Arc<TrackLocalStaticSample>>;

/// Capture backed by sample tracks (Opus audio, VP8 video). An encoder feeds
/// them through [`write_sample`]; only one holder can use them at a time.
pub struct SampleCapture {
    stream_id: String,
    in_use: AtomicBool,
}

impl SampleCapture {
    pub fn new(stream_id: impl Into<String>) -> Self {
        Self {
            stream_id: stream_id.into(),
            in_use: AtomicBool::new(false),
        }
    }

    fn track(&self, id: &str, mime_type: &str) -> Arc<TrackLocalStaticSample> {
        Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: mime_type.to_owned(),
                ..Default::default()
            },
            id.to_owned(),
            self.stream_id.clone(),
        ))
    }
}

#[async_trait]
impl MediaCapture for SampleCapture {
    type Track = Arc<TrackLocalStaticSample>;

    async fn acquire(&self) -> Result<Vec<SampleTrack>, ClientError> {
        if self.in_use.swap(true, Ordering::AcqRel) {
            return Err(ErrorKind::DeviceUnavailable.into());
        }

        info!(stream = %self.stream_id, "Local capture started");
        Ok(vec![
            LocalTrack::new("audio", MediaKind::Audio, self.track("audio", MIME_TYPE_OPUS)),
            LocalTrack::new("video", MediaKind::Video, self.track("video", MIME_TYPE_VP8)),
        ])
    }

    async fn release(&self, tracks: Vec<SampleTrack>) {
        drop(tracks);
        self.in_use.store(false, Ordering::Release);
        info!(stream = %self.stream_id, "Local capture stopped");
    }
}

/// Writes one encoded sample unless the track is disabled. Returns whether the
/// sample was sent.
pub async fn write_sample(track: &SampleTrack, sample: &Sample) -> Result<bool, ClientError> {
    if !track.is_enabled() {
        return Ok(false);
    }

    track
        .track
        .write_sample(sample)
        .await
        .map_err(ClientError::media)?;
    Ok(true)
}
