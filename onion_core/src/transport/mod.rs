/*! Delivery of envelopes to addresses.

Actors never talk to each other directly. They hand an envelope to a
`Transport` together with the address of the next hop, and the transport puts
it into the mailbox bound to that address. Delivery is at most once: an
envelope that can't be delivered is dropped and reported with
`TransportError`.
*/

mod local;
mod tcp;

pub use self::local::*;
pub use self::tcp::*;

use std::io::Error as IoError;

use futures::future::BoxFuture;
use thiserror::Error;

use onion_packet::address::Address;

/// Number of envelopes a mailbox holds before senders have to wait.
pub const MAILBOX_SIZE: usize = 32;

/// Error that can happen when delivering an envelope.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Nothing is bound to the address.
    #[error("Address {0} is unreachable")]
    Unreachable(Address),
    /// Mailbox bound to the address was closed.
    #[error("Mailbox of {0} is closed")]
    Closed(Address),
    /// IO error.
    #[error("IO error: {0}")]
    Io(IoError),
}

/// Error that can happen when binding a mailbox to an address.
#[derive(Debug, Error)]
pub enum BindError {
    /// Another mailbox is bound to the address already.
    #[error("Address {0} is already in use")]
    AddressInUse(Address),
    /// Address can't be represented by this transport.
    #[error("Address {0} is not supported by the transport")]
    Unsupported(Address),
    /// IO error.
    #[error("IO error: {0}")]
    Io(IoError),
}

/// Fire-and-forget delivery of envelopes.
pub trait Transport: Send + Sync {
    /// Deliver `envelope` to the mailbox bound to `address`.
    fn send(&self, address: Address, envelope: String) -> BoxFuture<'_, Result<(), TransportError>>;
}
