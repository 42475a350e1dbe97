/*! Random circuits of relays and onion envelopes for them.
*/

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::thread_rng;

use onion_packet::address::*;
use onion_packet::node::Node;
use onion_packet::onion::*;

use crate::onion::errors::*;

/// Ordered list of distinct relays a message passes through. The first relay
/// receives the envelope from the sender, the last one delivers the plaintext
/// to the recipient.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Circuit {
    nodes: Vec<Node>,
}

/// Envelope ready to be sent together with the address of the first relay.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OnionPacket {
    /// Address of the first relay of the circuit.
    pub first_hop: Address,
    /// Envelope with one layer for every relay.
    pub envelope: String,
}

impl Circuit {
    /// Relays in forwarding order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Ids of relays in forwarding order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|node| node.node_id).collect()
    }

    /// Number of relays.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the circuit has no relays.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /** Wrap `plaintext` for this circuit so that the last relay delivers it
    to `destination`.

    Layers are added starting from the last relay: its layer holds the
    destination and the plaintext, the layer of every previous relay holds
    the address of the next relay and the envelope built so far.
    */
    pub fn build_onion(
        &self,
        plaintext: &str,
        destination: Address,
        address_space: &AddressSpace,
    ) -> Result<OnionPacket, BuildOnionError> {
        let mut envelope = plaintext.to_owned();
        let mut next_hop = destination;

        for node in self.nodes.iter().rev() {
            envelope = wrap_one_layer(&envelope, next_hop, &node.public_key)
                .map_err(BuildOnionError::Encrypt)?;
            next_hop = address_space.relay_address(node.node_id)
                .map_err(BuildOnionError::Address)?;
        }

        Ok(OnionPacket {
            first_hop: next_hop,
            envelope,
        })
    }
}

impl From<Vec<Node>> for Circuit {
    fn from(nodes: Vec<Node>) -> Self {
        Circuit { nodes }
    }
}

/// Chooses relays for circuits uniformly at random.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CircuitBuilder {
    length: usize,
}

impl Default for CircuitBuilder {
    fn default() -> Self {
        CircuitBuilder::new(CIRCUIT_LENGTH)
    }
}

impl CircuitBuilder {
    /// Create new `CircuitBuilder` for circuits of `length` relays.
    pub fn new(length: usize) -> Self {
        CircuitBuilder { length }
    }

    /// Number of relays in built circuits.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Choose `length` distinct relays from `nodes`. Relays that occur more
    /// than once are counted once.
    pub fn build(&self, nodes: &[Node]) -> Result<Circuit, CircuitError> {
        let mut seen = HashSet::new();
        let mut candidates = nodes.iter()
            .filter(|node| seen.insert(node.node_id))
            .cloned()
            .collect::<Vec<_>>();

        if candidates.len() < self.length {
            return Err(CircuitError::InsufficientNodes {
                required: self.length,
                available: candidates.len(),
            });
        }

        let (chosen, _) = candidates.partial_shuffle(&mut thread_rng(), self.length);
        Ok(Circuit {
            nodes: chosen.to_vec(),
        })
    }
}
