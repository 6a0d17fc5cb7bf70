use std::time::Duration;

use meshroom_core::utils::default_ice_servers;
use meshroom_core::{ChatMessage, ClientSignal, ParticipantId, ServerSignal};
use serde_json::json;

use crate::integration::init_tracing;
use crate::utils::{WsClient, spawn_relay};

fn id(s: &str) -> ParticipantId {
    ParticipantId::parse(s).unwrap()
}

async fn join(client: &mut WsClient, name: &str) {
    client
        .send(&ClientSignal::Join { id: name.into() })
        .await
        .unwrap();
    let ack = client
        .recv_until(|s| matches!(s, ServerSignal::JoinAccepted { .. } | ServerSignal::JoinRejected { .. }))
        .await
        .unwrap();
    assert_eq!(ack, ServerSignal::JoinAccepted { id: id(name) });
}

#[tokio::test]
async fn test_ice_config_is_pushed_on_connect() {
    init_tracing();
    let (addr, _state) = spawn_relay().await.unwrap();

    let mut client = WsClient::connect(addr, "ice").await.unwrap();

    assert_eq!(
        client.recv().await.unwrap(),
        ServerSignal::IceConfig {
            ice_servers: default_ice_servers()
        },
        "first frame is the ICE configuration"
    );
}

#[tokio::test]
async fn test_malformed_frame_keeps_socket_open() {
    init_tracing();
    let (addr, _state) = spawn_relay().await.unwrap();

    let mut client = WsClient::connect(addr, "malformed").await.unwrap();
    client.recv().await.unwrap();

    client.send_raw("{ not json").await.unwrap();
    client
        .send_raw(&json!({ "op": "Teleport", "d": {} }).to_string())
        .await
        .unwrap();

    join(&mut client, "alice").await;
    assert_eq!(
        client.recv().await.unwrap(),
        ServerSignal::Participants {
            ids: vec![id("alice")]
        }
    );
}

#[tokio::test]
async fn test_negotiation_is_relayed_between_sockets() {
    init_tracing();
    let (addr, _state) = spawn_relay().await.unwrap();

    let mut alice = WsClient::connect(addr, "relay").await.unwrap();
    let mut bob = WsClient::connect(addr, "relay").await.unwrap();
    join(&mut alice, "alice").await;
    join(&mut bob, "bob").await;

    let payload = json!({ "type": "offer", "sdp": "v=0" });
    alice
        .send(&ClientSignal::Offer {
            to: id("bob"),
            payload: payload.clone(),
        })
        .await
        .unwrap();

    let offer = bob
        .recv_until(|s| matches!(s, ServerSignal::Offer { .. }))
        .await
        .unwrap();
    assert_eq!(
        offer,
        ServerSignal::Offer {
            from: id("alice"),
            payload
        }
    );
}

#[tokio::test]
async fn test_closed_socket_leaves_exactly_once() {
    init_tracing();
    let (addr, state) = spawn_relay().await.unwrap();

    let mut alice = WsClient::connect(addr, "leave").await.unwrap();
    let mut bob = WsClient::connect(addr, "leave").await.unwrap();
    join(&mut alice, "alice").await;
    join(&mut bob, "bob").await;
    bob.recv_until(|s| *s == ServerSignal::Participants { ids: vec![id("alice"), id("bob")] })
        .await
        .unwrap();

    alice.close().await.unwrap();

    assert_eq!(
        bob.recv().await.unwrap(),
        ServerSignal::Participants {
            ids: vec![id("bob")]
        }
    );

    // The chat echo orders after any further snapshot the session would send.
    let chat = ChatMessage::now(id("bob"), "still here?");
    bob.send(&ClientSignal::Chat(chat.clone())).await.unwrap();
    assert_eq!(bob.recv().await.unwrap(), ServerSignal::Chat(chat));

    let poll = async {
        while state.signaling.connection_count() != 1 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(2), poll)
        .await
        .expect("closed socket is removed from the signaling table");

    // The identifier is free again.
    let mut again = WsClient::connect(addr, "leave").await.unwrap();
    join(&mut again, "alice").await;
}
