use meshroom_client::DEFAULT_OFFER_DELAY;
use meshroom_client::peer::PeerState;
use meshroom_core::{ClientSignal, Role, SdpKind};
use std::time::Duration;

use crate::integration::{create_orchestrator, init_tracing};
use crate::utils::{PathCall, candidate_payload, id, ids, next_signal, wait_until};

#[tokio::test(start_paused = true)]
async fn test_initiator_offers_after_delay() {
    init_tracing();

    let mut t = create_orchestrator("A");
    let b = id("B");

    t.peers.apply_snapshot(&ids(&["A", "B"]));
    assert_eq!(t.peers.peer_role(&b), Some(Role::Initiator));
    assert_eq!(t.peers.peer_state(&b), Some(PeerState::Pending));

    tokio::time::sleep(DEFAULT_OFFER_DELAY - Duration::from_millis(1)).await;
    assert!(t.signals.try_recv().is_err(), "no offer before the delay");

    let path = t.factory.latest_path_to(&b).expect("path created");
    assert_eq!(
        path.calls(),
        vec![
            PathCall::AttachTrack("mic".into()),
            PathCall::AttachTrack("cam".into()),
        ],
        "captured tracks are attached as soon as the record exists"
    );

    match next_signal(&mut t.signals).await {
        ClientSignal::Offer { to, payload } => {
            assert_eq!(to, b);
            assert_eq!(payload["type"], "offer");
        }
        other => panic!("expected an offer, got {other:?}"),
    }

    wait_until(|| path.count(&PathCall::SetLocal(SdpKind::Offer)) == 1).await;
    assert_eq!(
        &path.calls()[2..],
        &[PathCall::CreateOffer, PathCall::SetLocal(SdpKind::Offer)],
        "the offer is stored locally before it is sent"
    );
    assert_eq!(t.peers.peer_state(&b), Some(PeerState::Negotiating));
}

#[tokio::test(start_paused = true)]
async fn test_tie_break_is_byte_wise() {
    init_tracing();

    let mut t = create_orchestrator("10");
    t.peers.apply_snapshot(&ids(&["10", "9"]));

    assert_eq!(
        t.peers.peer_role(&id("9")),
        Some(Role::Initiator),
        "\"10\" sorts before \"9\" byte-wise, so it initiates"
    );
}

#[tokio::test(start_paused = true)]
async fn test_local_identity_never_gets_a_record() {
    init_tracing();

    let mut t = create_orchestrator("A");

    t.peers.apply_snapshot(&ids(&["A"]));
    t.peers.on_newcomer(&id("A"));
    t.peers.on_candidate(id("A"), candidate_payload("candidate:0"));

    assert!(t.peers.peers().is_empty());
    assert_eq!(t.factory.created(), 0);
}
