/*! Directory of relays and their public keys.
*/

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use onion_crypto::*;
use onion_packet::node::*;

/// Error that can happen when registering a relay.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum RegisterError {
    /// Relay with this id is registered already.
    #[error("Node {0} is already registered")]
    AlreadyRegistered(NodeId),
}

/// Registry of relays. Entries are never changed or removed once added.
#[derive(Clone, Default)]
pub struct Directory {
    /// Registered relays in order of registration.
    nodes: Arc<RwLock<Vec<Node>>>,
}

impl Directory {
    /// Create new empty `Directory`.
    pub fn new() -> Self {
        Directory::default()
    }

    /// Add a relay.
    pub async fn register(&self, node_id: NodeId, public_key: PublicKey) -> Result<(), RegisterError> {
        let mut nodes = self.nodes.write().await;
        if nodes.iter().any(|node| node.node_id == node_id) {
            return Err(RegisterError::AlreadyRegistered(node_id));
        }

        debug!("Registered node {} with key {}", node_id, export_key(&public_key));
        nodes.push(Node::new(node_id, public_key));
        Ok(())
    }

    /// Snapshot of all registered relays.
    pub async fn list_nodes(&self) -> Vec<Node> {
        self.nodes.read().await.clone()
    }

    /// Number of registered relays.
    pub async fn len(&self) -> usize {
        self.nodes.read().await.len()
    }

    /// Check if no relay is registered.
    pub async fn is_empty(&self) -> bool {
        self.nodes.read().await.is_empty()
    }
}
