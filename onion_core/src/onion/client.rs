/*! User endpoint that sends messages through random circuits.
*/

use std::sync::Arc;

use futures::channel::mpsc;
use futures::StreamExt;
use tokio::sync::RwLock;

use onion_packet::address::*;

use crate::directory::Directory;
use crate::onion::circuit::*;
use crate::onion::errors::*;
use crate::transport::Transport;

#[derive(Clone, Debug, Default)]
struct ClientState {
    last_sent: Option<String>,
    last_received: Option<String>,
    last_circuit: Vec<NodeId>,
}

/// Onion client of a single user.
#[derive(Clone)]
pub struct Client {
    user_id: UserId,
    directory: Directory,
    transport: Arc<dyn Transport>,
    address_space: AddressSpace,
    circuit_builder: CircuitBuilder,
    state: Arc<RwLock<ClientState>>,
}

impl Client {
    /// Create new `Client` that builds circuits of default length.
    pub fn new(
        user_id: UserId,
        directory: Directory,
        transport: Arc<dyn Transport>,
        address_space: AddressSpace,
    ) -> Self {
        Client {
            user_id,
            directory,
            transport,
            address_space,
            circuit_builder: CircuitBuilder::default(),
            state: Arc::new(RwLock::new(ClientState::default())),
        }
    }

    /// Replace the circuit builder.
    pub fn with_circuit_builder(mut self, circuit_builder: CircuitBuilder) -> Self {
        self.circuit_builder = circuit_builder;
        self
    }

    /// Id of the user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Address messages for this user are delivered to.
    pub fn address(&self) -> Result<Address, AddressError> {
        self.address_space.user_address(self.user_id)
    }

    /// Clients are alive as long as they exist.
    pub fn status(&self) -> &'static str {
        "live"
    }

    /// Last message this user sent.
    pub async fn last_sent_message(&self) -> Option<String> {
        self.state.read().await.last_sent.clone()
    }

    /// Last message delivered to this user.
    pub async fn last_received_message(&self) -> Option<String> {
        self.state.read().await.last_received.clone()
    }

    /// Relays of the circuit used for the last sent message.
    pub async fn last_circuit(&self) -> Vec<NodeId> {
        self.state.read().await.last_circuit.clone()
    }

    /** Send `message` to the user with `destination_user_id` through a new
    random circuit.

    Success means that the envelope was handed to the first relay, not that
    it reached the recipient.
    */
    pub async fn send_message(&self, message: &str, destination_user_id: UserId) -> Result<(), SendMessageError> {
        let destination = self.address_space.user_address(destination_user_id)
            .map_err(SendMessageError::Address)?;
        let nodes = self.directory.list_nodes().await;
        let circuit = self.circuit_builder.build(&nodes)
            .map_err(SendMessageError::Circuit)?;
        let packet = circuit.build_onion(message, destination, &self.address_space)
            .map_err(SendMessageError::BuildOnion)?;

        debug!(
            "User {} sends message to user {} through circuit {:?}",
            self.user_id, destination_user_id, circuit.node_ids()
        );

        {
            let mut state = self.state.write().await;
            state.last_sent = Some(message.to_owned());
            state.last_circuit = circuit.node_ids();
        }

        self.transport.send(packet.first_hop, packet.envelope).await
            .map_err(SendMessageError::Transport)
    }

    /// Accept a plaintext delivered by an exit relay.
    pub async fn handle_message(&self, message: String) {
        info!("User {} received message: {}", self.user_id, message);
        self.state.write().await.last_received = Some(message);
    }

    /// Handle messages from `mailbox` one by one until it's closed.
    pub async fn run(self, mut mailbox: mpsc::Receiver<String>) {
        info!("User {} is running", self.user_id);

        while let Some(message) = mailbox.next().await {
            self.handle_message(message).await;
        }

        info!("User {} stopped", self.user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use onion_crypto::*;
    use onion_packet::onion::*;

    use crate::transport::*;

    fn create_client(network: &LocalNetwork, directory: &Directory) -> Client {
        Client::new(0, directory.clone(), Arc::new(network.clone()), AddressSpace::default())
    }

    async fn register_relays(directory: &Directory, count: u32) -> Vec<KeyPair> {
        let mut keys = Vec::new();
        for node_id in 0..count {
            let pair = KeyPair::generate();
            directory.register(node_id, pair.public_key.clone()).await.unwrap();
            keys.push(pair);
        }
        keys
    }

    #[tokio::test]
    async fn send_message_to_first_relay() {
        let network = LocalNetwork::new();
        let directory = Directory::new();
        let address_space = AddressSpace::default();
        let keys = register_relays(&directory, 3).await;
        let mut mailboxes = Vec::new();
        for node_id in 0..3 {
            mailboxes.push(network.bind(address_space.relay_address(node_id).unwrap()).await.unwrap());
        }
        let client = create_client(&network, &directory);

        client.send_message("hello", 1).await.unwrap();

        let circuit = client.last_circuit().await;
        assert_eq!(circuit.len(), CIRCUIT_LENGTH);
        assert_eq!(client.last_sent_message().await, Some("hello".to_owned()));

        // envelope is peeled along the recorded circuit
        let first = circuit[0] as usize;
        let mut envelope = mailboxes[first].next().await.unwrap();
        for (i, &node_id) in circuit.iter().enumerate() {
            let payload = peel_one_layer(&envelope, &keys[node_id as usize].secret_key).unwrap();
            let expected = match circuit.get(i + 1) {
                Some(&next) => address_space.relay_address(next).unwrap(),
                None => address_space.user_address(1).unwrap(),
            };
            assert_eq!(payload.next_hop, expected);
            envelope = payload.inner;
        }
        assert_eq!(envelope, "hello");
    }

    #[tokio::test]
    async fn send_message_insufficient_relays() {
        let network = LocalNetwork::new();
        let directory = Directory::new();
        register_relays(&directory, 2).await;
        let client = create_client(&network, &directory);

        let res = client.send_message("hello", 1).await;
        assert!(matches!(
            res,
            Err(SendMessageError::Circuit(CircuitError::InsufficientNodes { required: 3, available: 2 }))
        ));
        assert_eq!(client.last_sent_message().await, None);
        assert!(client.last_circuit().await.is_empty());
    }

    #[tokio::test]
    async fn send_message_invalid_destination() {
        let network = LocalNetwork::new();
        let directory = Directory::new();
        register_relays(&directory, 3).await;
        let client = create_client(&network, &directory);

        let res = client.send_message("hello", 1000).await;
        assert!(matches!(res, Err(SendMessageError::Address(AddressError::OutOfRange { id: 1000, .. }))));
    }

    #[tokio::test]
    async fn send_message_unreachable_relay() {
        let network = LocalNetwork::new();
        let directory = Directory::new();
        register_relays(&directory, 3).await;
        let client = create_client(&network, &directory);

        let res = client.send_message("hello", 1).await;
        assert!(matches!(res, Err(SendMessageError::Transport(TransportError::Unreachable(_)))));
    }

    #[tokio::test]
    async fn send_message_short_circuit() {
        let network = LocalNetwork::new();
        let directory = Directory::new();
        let address_space = AddressSpace::default();
        let keys = register_relays(&directory, 1).await;
        let mut rx = network.bind(address_space.relay_address(0).unwrap()).await.unwrap();
        let client = create_client(&network, &directory)
            .with_circuit_builder(CircuitBuilder::new(1));

        client.send_message("hello", 2).await.unwrap();

        let envelope = rx.next().await.unwrap();
        let payload = peel_one_layer(&envelope, &keys[0].secret_key).unwrap();
        assert_eq!(payload.next_hop, address_space.user_address(2).unwrap());
        assert_eq!(payload.inner, "hello");
    }

    #[tokio::test]
    async fn handle_message() {
        let network = LocalNetwork::new();
        let directory = Directory::new();
        let client = create_client(&network, &directory);
        assert_eq!(client.last_received_message().await, None);

        client.handle_message("first".to_owned()).await;
        client.handle_message("second".to_owned()).await;

        assert_eq!(client.last_received_message().await, Some("second".to_owned()));
        assert_eq!(client.address().unwrap(), Address::new(3000).unwrap());
        assert_eq!(client.status(), "live");
    }
}
