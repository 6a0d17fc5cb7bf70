use meshroom_client::media::{LocalTrack, MediaKind};
use meshroom_client::ClientError;
use meshroom_core::ClientSignal;
use std::time::Duration;

use super::join_with_roster;
use crate::integration::{create_client, init_tracing};
use crate::utils::{MockCapture, PathCall, id, next_signal, wait_until};

#[tokio::test(start_paused = true)]
async fn test_mute_does_not_renegotiate() {
    init_tracing();

    let mut t = create_client(MockCapture::new());
    join_with_roster(&mut t, "alice", &["alice", "bob"]).await;

    assert!(matches!(
        next_signal(&mut t.signals).await,
        ClientSignal::Offer { .. }
    ));
    let path = t.factory.latest_path_to(&id("bob")).unwrap();

    t.client.set_audio_enabled(false).unwrap();
    assert!(!t.client.is_enabled(MediaKind::Audio));
    assert!(t.client.is_enabled(MediaKind::Video));

    let attached = path.attached();
    let mic = attached.iter().find(|track| track.id == "mic").unwrap();
    let cam = attached.iter().find(|track| track.id == "cam").unwrap();
    assert!(!mic.is_enabled(), "attached track shares the switch");
    assert!(cam.is_enabled());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(path.count(&PathCall::CreateOffer), 1);
    assert!(t.signals.try_recv().is_err());

    t.client.set_audio_enabled(true).unwrap();
    assert!(mic.is_enabled());
}

#[tokio::test(start_paused = true)]
async fn test_controls_require_a_session() {
    init_tracing();

    let mut t = create_client(MockCapture::new());

    assert_eq!(t.client.set_video_enabled(false), Err(ClientError::NotJoined));
    assert_eq!(
        t.client
            .publish_track(LocalTrack::new("screen", MediaKind::Video, ())),
        Err(ClientError::NotJoined)
    );
    assert!(!t.client.is_enabled(MediaKind::Audio));
}

#[tokio::test(start_paused = true)]
async fn test_published_track_inherits_mute() {
    init_tracing();

    let mut t = create_client(MockCapture::new());
    join_with_roster(&mut t, "alice", &["alice", "bob"]).await;
    let path = {
        wait_until(|| t.factory.latest_path_to(&id("bob")).is_some()).await;
        t.factory.latest_path_to(&id("bob")).unwrap()
    };

    t.client.set_video_enabled(false).unwrap();
    t.client
        .publish_track(LocalTrack::new("screen", MediaKind::Video, ()))
        .unwrap();

    wait_until(|| path.count(&PathCall::AttachTrack("screen".into())) == 1).await;
    let screen = path
        .attached()
        .into_iter()
        .find(|track| track.id == "screen")
        .unwrap();
    assert!(!screen.is_enabled());

    assert_eq!(t.client.unpublish_track("screen"), Ok(true));
    assert_eq!(t.client.unpublish_track("screen"), Ok(false));
    wait_until(|| path.count(&PathCall::DetachTrack("screen".into())) == 1).await;
}
