//! Errors of onion routing actors.

use thiserror::Error;

use onion_crypto::*;
use onion_packet::address::*;
use onion_packet::onion::PeelError;

use crate::transport::TransportError;

/// Error that can happen when choosing relays for a circuit.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum CircuitError {
    /// Directory has fewer distinct relays than a circuit needs.
    #[error("Not enough relays to build a circuit: required {required}, available {available}")]
    InsufficientNodes {
        /// Length of the circuit.
        required: usize,
        /// Number of distinct relays in the directory.
        available: usize,
    },
}

/// Error that can happen when wrapping a message for a circuit.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum BuildOnionError {
    /// Failed to encrypt a layer.
    #[error("Failed to encrypt onion layer")]
    Encrypt(EncryptionError),
    /// Relay id doesn't map to an address.
    #[error("Invalid relay address: {0}")]
    Address(AddressError),
}

/// Error that can happen when a relay handles an envelope.
#[derive(Debug, Error)]
pub enum HandleMessageError {
    /// Outer layer can't be removed with our key.
    #[error("Failed to peel onion layer: {0}")]
    Peel(PeelError),
    /// Remainder can't be delivered to the next hop.
    #[error("Failed to forward message: {0}")]
    Transport(TransportError),
}

/// Error that can happen when a client sends a message.
#[derive(Debug, Error)]
pub enum SendMessageError {
    /// Recipient id doesn't map to an address.
    #[error("Invalid recipient address: {0}")]
    Address(AddressError),
    /// Failed to choose relays.
    #[error("Failed to build circuit: {0}")]
    Circuit(CircuitError),
    /// Failed to wrap the message.
    #[error("Failed to build onion: {0}")]
    BuildOnion(BuildOnionError),
    /// Envelope can't be delivered to the first relay.
    #[error("Failed to send message: {0}")]
    Transport(TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circuit_error_display() {
        let error = CircuitError::InsufficientNodes { required: 3, available: 2 };
        assert_eq!(error.to_string(), "Not enough relays to build a circuit: required 3, available 2");
    }

    #[test]
    fn send_message_error_display() {
        let error = SendMessageError::Circuit(CircuitError::InsufficientNodes { required: 3, available: 0 });
        assert!(error.to_string().starts_with("Failed to build circuit: "));
    }
}
