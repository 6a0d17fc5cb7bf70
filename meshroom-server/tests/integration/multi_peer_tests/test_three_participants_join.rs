use meshroom_core::{ParticipantId, ServerSignal};

use crate::integration::{create_test_session, init_tracing};

fn newcomers(signals: &[ServerSignal]) -> Vec<ParticipantId> {
    signals
        .iter()
        .filter_map(|signal| match signal {
            ServerSignal::NewParticipant { id } => Some(id.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_three_participants_join() {
    init_tracing();

    let mut session = create_test_session();

    let a = session.connect_and_join("A").await.unwrap();
    let b = session.connect_and_join("B").await.unwrap();
    let c = session.connect_and_join("C").await.unwrap();
    session.settle().await.unwrap();

    let id = |raw: &str| ParticipantId::parse(raw).unwrap();
    let everyone = vec![id("A"), id("B"), id("C")];

    for conn in [a, b, c] {
        assert_eq!(
            session.signaling.last_snapshot_for(conn).await,
            Some(everyone.clone()),
            "every participant converges on the full roster"
        );
    }

    assert_eq!(
        newcomers(&session.signaling.delivered_to(a).await),
        vec![id("B"), id("C")]
    );
    assert_eq!(
        newcomers(&session.signaling.delivered_to(b).await),
        vec![id("C")]
    );
    assert!(
        newcomers(&session.signaling.delivered_to(c).await).is_empty(),
        "the joiner is never told about itself"
    );
}

#[tokio::test]
async fn test_snapshot_precedes_newcomer_notice() {
    init_tracing();

    let mut session = create_test_session();
    let a = session.connect_and_join("A").await.unwrap();
    session.settle().await.unwrap();
    session.signaling.clear().await;

    session.connect_and_join("B").await.unwrap();
    session.settle().await.unwrap();

    let signals = session.signaling.delivered_to(a).await;
    assert_eq!(signals.len(), 2);
    assert!(matches!(signals[0], ServerSignal::Participants { .. }));
    assert!(matches!(signals[1], ServerSignal::NewParticipant { .. }));
}
