use meshroom_client::media::{LocalTrack, MediaKind};
use meshroom_client::peer::PeerState;
use meshroom_core::{ClientSignal, SdpKind};

use crate::integration::{create_orchestrator, init_tracing};
use crate::utils::{PathCall, answer_payload, id, ids, next_signal, wait_for_state, wait_until};

#[tokio::test(start_paused = true)]
async fn test_published_track_renegotiates_existing_path() {
    init_tracing();

    let mut t = create_orchestrator("A");
    let b = id("B");

    t.peers.apply_snapshot(&ids(&["A", "B"]));
    assert!(matches!(
        next_signal(&mut t.signals).await,
        ClientSignal::Offer { .. }
    ));
    t.peers.on_answer(b.clone(), answer_payload("answer"));

    let path = t.factory.latest_path_to(&b).unwrap();
    let mut state = t.peers.watch_peer(&b).unwrap();
    path.connect();
    wait_for_state(&mut state, PeerState::Connected).await;

    t.peers.publish_track(LocalTrack::new("screen", MediaKind::Video, ()));
    assert!(matches!(
        next_signal(&mut t.signals).await,
        ClientSignal::Offer { .. }
    ));

    assert_eq!(t.factory.paths_to(&b).len(), 1, "same media path is reused");
    assert_eq!(path.count(&PathCall::CreateOffer), 2);
    assert!(path.attached().iter().any(|track| track.id == "screen"));

    t.peers.on_answer(b.clone(), answer_payload("answer-2"));
    wait_until(|| path.count(&PathCall::SetRemote(SdpKind::Answer)) == 2).await;
    wait_for_state(&mut state, PeerState::Connected).await;

    assert!(t.peers.unpublish_track("screen"));
    wait_until(|| path.count(&PathCall::DetachTrack("screen".into())) == 1).await;
    assert!(!t.peers.unpublish_track("screen"));
}
