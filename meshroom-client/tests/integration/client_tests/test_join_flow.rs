use meshroom_client::{ClientError, ClientEvent};
use meshroom_core::{ErrorKind, ServerSignal};

use super::join_with_roster;
use crate::integration::{create_client, init_tracing};
use crate::utils::{MockCapture, id, ids, next_event, next_signal};

#[tokio::test(start_paused = true)]
async fn test_join_creates_peer_records() {
    init_tracing();

    let mut t = create_client(MockCapture::new());
    assert!(!t.client.is_joined());

    join_with_roster(&mut t, "alice", &["alice", "bob", "carol"]).await;

    assert!(t.client.is_joined());
    assert_eq!(t.client.local_id(), Some(&id("alice")));
    assert_eq!(t.capture.acquisitions(), 1);
    assert_eq!(t.client.roster(), ids(&["alice", "bob", "carol"]).as_slice());
    assert_eq!(t.client.peers(), ids(&["bob", "carol"]));
    assert_eq!(
        t.client.attendance(),
        "Attendance List\n\n1. alice\n2. bob\n3. carol\n"
    );

    t.client
        .handle_signal(ServerSignal::NewParticipant { id: id("dave") })
        .await
        .unwrap();
    assert_eq!(t.client.peers(), ids(&["bob", "carol", "dave"]));
}

#[tokio::test(start_paused = true)]
async fn test_blank_identifier_is_not_sent() {
    init_tracing();

    let mut t = create_client(MockCapture::new());

    let err = t.client.join("   ").await.unwrap_err();
    assert_eq!(err.kind(), Some(&ErrorKind::InvalidIdentifier));
    assert_eq!(t.capture.acquisitions(), 0, "no devices for a blank id");
    assert!(t.signals.try_recv().is_err());
    assert!(t.client.local_id().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_unavailable_devices_block_join() {
    init_tracing();

    let mut t = create_client(MockCapture::unavailable());

    let err = t.client.join("alice").await.unwrap_err();
    assert_eq!(err.kind(), Some(&ErrorKind::DeviceUnavailable));
    assert!(t.signals.try_recv().is_err(), "join is not requested");
    assert!(!t.client.is_joined());
}

#[tokio::test(start_paused = true)]
async fn test_second_join_is_refused() {
    init_tracing();

    let mut t = create_client(MockCapture::new());

    t.client.join("alice").await.unwrap();
    let err = t.client.join("alice").await.unwrap_err();

    assert_eq!(err, ClientError::Kind(ErrorKind::AlreadyJoined));
    assert_eq!(t.capture.acquisitions(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rejection_releases_media_and_allows_retry() {
    init_tracing();

    let mut t = create_client(MockCapture::new());

    t.client.join("alice").await.unwrap();
    next_signal(&mut t.signals).await;

    t.client
        .handle_signal(ServerSignal::rejected(ErrorKind::DuplicateIdentifier))
        .await
        .unwrap();
    assert_eq!(
        next_event(&mut t.events).await,
        ClientEvent::JoinRejected {
            error: ErrorKind::DuplicateIdentifier
        }
    );
    assert_eq!(t.capture.releases(), 1);
    assert!(t.client.local_id().is_none());

    // A repeated rejection has nothing left to release.
    t.client
        .handle_signal(ServerSignal::rejected(ErrorKind::DuplicateIdentifier))
        .await
        .unwrap();
    assert_eq!(t.capture.releases(), 1);

    join_with_roster(&mut t, "alice2", &["alice", "alice2"]).await;
    assert_eq!(t.capture.acquisitions(), 2);
    assert_eq!(t.client.peers(), ids(&["alice"]));
}

#[tokio::test(start_paused = true)]
async fn test_ice_config_reaches_new_paths() {
    init_tracing();

    let mut t = create_client(MockCapture::new());
    let turn = meshroom_core::IceServerConfig {
        urls: vec!["turn:turn.example.org:3478".into()],
        username: Some("user".into()),
        credential: Some("secret".into()),
    };

    t.client
        .handle_signal(ServerSignal::IceConfig {
            ice_servers: vec![turn.clone()],
        })
        .await
        .unwrap();
    assert_eq!(t.client.ice_servers(), &[turn.clone()]);

    join_with_roster(&mut t, "alice", &["alice", "bob"]).await;

    crate::utils::wait_until(|| t.factory.latest_path_to(&id("bob")).is_some()).await;
    let path = t.factory.latest_path_to(&id("bob")).unwrap();
    assert_eq!(path.ice_servers, vec![turn]);
}
