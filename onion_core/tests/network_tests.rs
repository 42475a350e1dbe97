use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use onion_core::network::*;
use onion_core::onion::client::Client;
use onion_core::onion::errors::*;
use onion_packet::address::*;

async fn wait_for_message(client: &Client) -> String {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if let Some(message) = client.last_received_message().await {
                return message;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }).await.unwrap()
}

async fn send_and_check(network: &Network) {
    let alice = network.user(0).unwrap();
    let bob = network.user(1).unwrap();

    alice.send_message("hello bob", 1).await.unwrap();
    assert_eq!(wait_for_message(bob).await, "hello bob");
    assert_eq!(alice.last_sent_message().await, Some("hello bob".to_owned()));
    assert_eq!(alice.last_received_message().await, None);

    // every relay of the circuit has seen the message
    let circuit = alice.last_circuit().await;
    assert_eq!(circuit.len(), 3);
    let exit = network.relay(circuit[2]).unwrap();
    assert_eq!(exit.last_received_decrypted_message().await, Some("hello bob".to_owned()));
    assert_eq!(exit.last_message_destination().await, bob.address().ok());
    for (i, &node_id) in circuit[..2].iter().enumerate() {
        let relay = network.relay(node_id).unwrap();
        let next = network.relay(circuit[i + 1]).unwrap();
        assert_eq!(
            relay.last_received_decrypted_message().await,
            next.last_received_encrypted_message().await
        );
        assert_ne!(relay.last_received_decrypted_message().await, Some("hello bob".to_owned()));
    }
}

#[tokio::test]
async fn local_network_delivers_message() {
    let network = launch_network(&NetworkConfig::default()).await.unwrap();
    send_and_check(&network).await;
}

#[tokio::test]
async fn tcp_network_delivers_message() {
    let config = NetworkConfig {
        relays: 4,
        users: 2,
        address_space: AddressSpace::new(41_000, 42_000, 100).unwrap(),
        transport: TransportKind::Tcp(IpAddr::V4(Ipv4Addr::LOCALHOST)),
    };
    let network = launch_network(&config).await.unwrap();
    send_and_check(&network).await;
}

#[tokio::test]
async fn users_reply_to_each_other() {
    let network = launch_network(&NetworkConfig::default()).await.unwrap();
    let alice = network.user(0).unwrap();
    let bob = network.user(1).unwrap();

    alice.send_message("ping", 1).await.unwrap();
    assert_eq!(wait_for_message(bob).await, "ping");
    bob.send_message("pong", 0).await.unwrap();
    assert_eq!(wait_for_message(alice).await, "pong");
}

#[tokio::test]
async fn send_without_enough_relays() {
    let config = NetworkConfig {
        relays: 2,
        ..NetworkConfig::default()
    };
    let network = launch_network(&config).await.unwrap();

    let res = network.user(0).unwrap().send_message("hello", 1).await;
    assert!(matches!(
        res,
        Err(SendMessageError::Circuit(CircuitError::InsufficientNodes { required: 3, available: 2 }))
    ));
}

#[tokio::test]
async fn tcp_network_relaunch_after_drop() {
    let config = NetworkConfig {
        relays: 3,
        users: 2,
        address_space: AddressSpace::new(43_000, 44_000, 100).unwrap(),
        transport: TransportKind::Tcp(IpAddr::V4(Ipv4Addr::LOCALHOST)),
    };

    let network = launch_network(&config).await.unwrap();
    drop(network);
    tokio::time::sleep(Duration::from_millis(200)).await;

    // all listeners are closed, so the same ports can be bound again
    let network = launch_network(&config).await.unwrap();
    let alice = network.user(0).unwrap();
    alice.send_message("hello again", 1).await.unwrap();
    assert_eq!(wait_for_message(network.user(1).unwrap()).await, "hello again");
}

#[tokio::test]
async fn tcp_network_failed_launch_releases_ports() {
    let address_space = AddressSpace::new(45_000, 46_000, 100).unwrap();
    let config = NetworkConfig {
        relays: 3,
        users: 2,
        address_space,
        transport: TransportKind::Tcp(IpAddr::V4(Ipv4Addr::LOCALHOST)),
    };

    // the port of user 1 is taken, so launching stops after binding every relay and user 0
    let blocker = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 45_001)).await.unwrap();
    let res = launch_network(&config).await;
    assert!(matches!(res, Err(LaunchError::Bind(_))));
    drop(blocker);
    tokio::time::sleep(Duration::from_millis(200)).await;

    let network = launch_network(&config).await.unwrap();
    assert_eq!(network.relays().len(), 3);
}
