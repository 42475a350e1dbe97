/*! Relay that removes one layer of every envelope and forwards the rest.
*/

use std::sync::Arc;

use futures::channel::mpsc;
use futures::StreamExt;
use tokio::sync::RwLock;

use onion_crypto::*;
use onion_packet::address::*;
use onion_packet::node::Node;
use onion_packet::onion::*;

use crate::onion::errors::*;
use crate::transport::Transport;

/// What the relay has seen last.
#[derive(Clone, Debug, Default)]
struct RelayState {
    last_encrypted: Option<String>,
    last_decrypted: Option<String>,
    last_destination: Option<Address>,
}

/// Onion relay. Knows nothing about circuits: every envelope is peeled with
/// its own secret key and sent wherever the layer says.
#[derive(Clone)]
pub struct Relay {
    node_id: NodeId,
    keys: Arc<KeyPair>,
    transport: Arc<dyn Transport>,
    state: Arc<RwLock<RelayState>>,
}

impl Relay {
    /// Create new `Relay` with a freshly generated key pair.
    pub fn new(node_id: NodeId, transport: Arc<dyn Transport>) -> Self {
        Relay::with_keys(node_id, KeyPair::generate(), transport)
    }

    /// Create new `Relay` with the given key pair.
    pub fn with_keys(node_id: NodeId, keys: KeyPair, transport: Arc<dyn Transport>) -> Self {
        Relay {
            node_id,
            keys: Arc::new(keys),
            transport,
            state: Arc::new(RwLock::new(RelayState::default())),
        }
    }

    /// Id of this relay.
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Key other peers encrypt layers for this relay with.
    pub fn public_key(&self) -> &PublicKey {
        &self.keys.public_key
    }

    /// Directory entry of this relay.
    pub fn node(&self) -> Node {
        Node::new(self.node_id, self.keys.public_key.clone())
    }

    /// Secret key in transport text. Used by inspection tools only.
    pub fn exported_secret_key(&self) -> String {
        export_key(&self.keys.secret_key)
    }

    /// Relays are alive as long as they exist.
    pub fn status(&self) -> &'static str {
        "live"
    }

    /// Envelope as it was received last time.
    pub async fn last_received_encrypted_message(&self) -> Option<String> {
        self.state.read().await.last_encrypted.clone()
    }

    /// Envelope that was forwarded last time.
    pub async fn last_received_decrypted_message(&self) -> Option<String> {
        self.state.read().await.last_decrypted.clone()
    }

    /// Address the last envelope was forwarded to.
    pub async fn last_message_destination(&self) -> Option<Address> {
        self.state.read().await.last_destination
    }

    /** Peel one layer of `envelope` and forward the remainder to the next
    hop.

    Envelopes that can't be peeled are dropped and nothing is forwarded.
    State is updated only after a successful peel and before forwarding, so
    it's updated even if delivery to the next hop fails.
    */
    pub async fn handle_message(&self, envelope: String) -> Result<(), HandleMessageError> {
        let payload = peel_one_layer(&envelope, &self.keys.secret_key)
            .map_err(HandleMessageError::Peel)?;
        let LayerPayload { next_hop, inner } = payload;

        trace!("Relay {} forwards {} bytes to {}", self.node_id, inner.len(), next_hop);

        {
            let mut state = self.state.write().await;
            state.last_encrypted = Some(envelope);
            state.last_decrypted = Some(inner.clone());
            state.last_destination = Some(next_hop);
        }

        self.transport.send(next_hop, inner).await
            .map_err(HandleMessageError::Transport)
    }

    /// Handle envelopes from `mailbox` one by one until it's closed.
    pub async fn run(self, mut mailbox: mpsc::Receiver<String>) {
        info!("Relay {} is running", self.node_id);

        while let Some(envelope) = mailbox.next().await {
            if let Err(err) = self.handle_message(envelope).await {
                warn!("Relay {} failed to handle message: {}", self.node_id, err);
            }
        }

        info!("Relay {} stopped", self.node_id);
    }
}
