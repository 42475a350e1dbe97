/*! Relay entry as it is stored in the directory.
*/

use onion_crypto::*;

pub use crate::address::NodeId;

/// Relay registered in the directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    /// Identifier of the relay. Its address is derived from it.
    pub node_id: NodeId,
    /// `PublicKey` layers for this relay are encrypted with.
    pub public_key: PublicKey,
}

impl Node {
    /// Create new `Node`.
    pub fn new(node_id: NodeId, public_key: PublicKey) -> Self {
        Node { node_id, public_key }
    }

    /// Create new `Node` from a public key in transport text.
    pub fn from_exported(node_id: NodeId, public_key: &str) -> Result<Self, KeyImportError> {
        Ok(Node {
            node_id,
            public_key: import_key(public_key)?,
        })
    }

    /// Public key of the relay in transport text.
    pub fn exported_public_key(&self) -> String {
        export_key(&self.public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_exported_round_trip() {
        let keys = KeyPair::generate();
        let node = Node::new(3, keys.public_key.clone());

        let restored = Node::from_exported(3, &node.exported_public_key()).unwrap();
        assert_eq!(restored, node);
    }

    #[test]
    fn node_from_invalid_key() {
        assert_eq!(Node::from_exported(3, "abc"), Err(KeyImportError::Encoding));
    }
}
