use meshroom_client::media::PathEvent;
use meshroom_client::peer::PeerState;
use meshroom_core::{ClientSignal, SdpKind};

use crate::integration::{create_orchestrator, init_tracing};
use crate::utils::{
    PathCall, answer_payload, candidate_payload, id, ids, next_signal, offer_payload,
    wait_for_state, wait_until,
};

#[tokio::test(start_paused = true)]
async fn test_initiator_ignores_colliding_offer() {
    init_tracing();

    let mut t = create_orchestrator("A");
    let b = id("B");

    t.peers.apply_snapshot(&ids(&["A", "B"]));
    assert!(matches!(
        next_signal(&mut t.signals).await,
        ClientSignal::Offer { .. }
    ));
    let path = t.factory.latest_path_to(&b).unwrap();
    let mut state = t.peers.watch_peer(&b).unwrap();

    t.peers.on_offer(b.clone(), offer_payload("colliding"));
    t.peers.on_answer(b.clone(), answer_payload("answer-from-b"));
    wait_until(|| path.count(&PathCall::SetRemote(SdpKind::Answer)) == 1).await;

    assert_eq!(path.count(&PathCall::SetRemote(SdpKind::Offer)), 0);
    assert_eq!(path.count(&PathCall::Rollback), 0);

    // A repeated answer finds no outstanding offer.
    t.peers.on_answer(b.clone(), answer_payload("again"));
    t.peers.on_candidate(b.clone(), candidate_payload("candidate:after"));
    wait_until(|| path.count(&PathCall::AddCandidate("candidate:after".into())) == 1).await;
    assert_eq!(path.count(&PathCall::SetRemote(SdpKind::Answer)), 1);

    path.connect();
    wait_for_state(&mut state, PeerState::Connected).await;
}

#[tokio::test(start_paused = true)]
async fn test_responder_yields_on_collision() {
    init_tracing();

    let mut t = create_orchestrator("B");
    let a = id("A");

    t.peers.on_offer(a.clone(), offer_payload("first"));
    assert!(matches!(
        next_signal(&mut t.signals).await,
        ClientSignal::Answer { .. }
    ));
    let path = t.factory.latest_path_to(&a).unwrap();
    let mut state = t.peers.watch_peer(&a).unwrap();
    path.connect();
    wait_for_state(&mut state, PeerState::Connected).await;

    // Once connected, the responder may renegotiate on its own.
    path.emit(PathEvent::NegotiationNeeded);
    assert!(matches!(
        next_signal(&mut t.signals).await,
        ClientSignal::Offer { .. }
    ));

    t.peers.on_offer(a.clone(), offer_payload("collides"));
    assert!(matches!(
        next_signal(&mut t.signals).await,
        ClientSignal::Answer { .. }
    ));
    assert_eq!(path.count(&PathCall::Rollback), 1);
    assert_eq!(path.count(&PathCall::SetRemote(SdpKind::Offer)), 2);

    // Its own change is offered again once the collision is resolved.
    assert!(matches!(
        next_signal(&mut t.signals).await,
        ClientSignal::Offer { .. }
    ));
}
