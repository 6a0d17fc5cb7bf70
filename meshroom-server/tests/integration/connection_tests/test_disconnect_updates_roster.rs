use meshroom_core::{ParticipantId, ServerSignal};

use crate::integration::{create_test_session, init_tracing};

#[tokio::test]
async fn test_disconnect_broadcasts_remaining_roster() {
    init_tracing();

    let mut session = create_test_session();
    let a = session.connect_and_join("A").await.unwrap();
    let b = session.connect_and_join("B").await.unwrap();
    let c = session.connect_and_join("C").await.unwrap();
    session.settle().await.unwrap();
    session.signaling.clear().await;

    session.disconnect(b).await.unwrap();
    session.settle().await.unwrap();

    let expected = vec![
        ParticipantId::parse("A").unwrap(),
        ParticipantId::parse("C").unwrap(),
    ];
    assert_eq!(session.signaling.last_snapshot_for(a).await, Some(expected.clone()));
    assert_eq!(session.signaling.last_snapshot_for(c).await, Some(expected));
    assert_eq!(
        session.signaling.count_for(b).await,
        0,
        "nothing is delivered to a departed connection"
    );
}

#[tokio::test]
async fn test_identifier_is_reusable_after_departure() {
    init_tracing();

    let mut session = create_test_session();
    let first = session.connect_and_join("alice").await.unwrap();
    session.disconnect(first).await.unwrap();

    let again = session.connect_and_join("alice").await.unwrap();
    session.settle().await.unwrap();

    let alice = ParticipantId::parse("alice").unwrap();
    assert!(
        session
            .signaling
            .delivered_to(again)
            .await
            .contains(&ServerSignal::JoinAccepted { id: alice })
    );
}

#[tokio::test]
async fn test_disconnect_before_join_is_silent() {
    init_tracing();

    let mut session = create_test_session();
    let present = session.connect_and_join("alice").await.unwrap();
    session.settle().await.unwrap();
    session.signaling.clear().await;

    let lurker = session.connect().await.unwrap();
    session.disconnect(lurker).await.unwrap();
    session.settle().await.unwrap();

    assert_eq!(session.signaling.count_for(present).await, 0);
}
