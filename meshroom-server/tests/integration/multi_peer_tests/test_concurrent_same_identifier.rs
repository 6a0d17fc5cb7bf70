use meshroom_core::ServerSignal;

use crate::integration::{create_test_session, init_tracing};

#[tokio::test]
async fn test_concurrent_joins_with_same_identifier() {
    init_tracing();

    let mut session = create_test_session();

    let mut conns = Vec::new();
    for _ in 0..5 {
        conns.push(session.connect().await.unwrap());
    }

    let joins = conns.iter().map(|conn| session.join(*conn, "same"));
    for result in futures::future::join_all(joins).await {
        result.unwrap();
    }
    session.settle().await.unwrap();

    let mut accepted = 0;
    let mut rejected = 0;
    for conn in &conns {
        for signal in session.signaling.delivered_to(*conn).await {
            match signal {
                ServerSignal::JoinAccepted { .. } => accepted += 1,
                ServerSignal::JoinRejected { .. } => rejected += 1,
                _ => {}
            }
        }
    }

    assert_eq!(accepted, 1, "exactly one connection wins the identifier");
    assert_eq!(rejected, conns.len() - 1);
}
