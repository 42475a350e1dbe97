/*! In-process transport for simulations and tests.
*/

use std::collections::HashMap;
use std::sync::Arc;

use futures::channel::mpsc;
use futures::future::{BoxFuture, FutureExt};
use futures::SinkExt;
use tokio::sync::RwLock;

use onion_packet::address::Address;

use super::*;

/// Mailboxes of all actors of one process indexed by their addresses.
#[derive(Clone, Default)]
pub struct LocalNetwork {
    mailboxes: Arc<RwLock<HashMap<Address, mpsc::Sender<String>>>>,
}

impl LocalNetwork {
    /// Create new `LocalNetwork` without any mailboxes.
    pub fn new() -> Self {
        LocalNetwork::default()
    }

    /// Bind a new mailbox to `address`. Envelopes sent to the address can be
    /// read from the returned receiver.
    pub async fn bind(&self, address: Address) -> Result<mpsc::Receiver<String>, BindError> {
        let mut mailboxes = self.mailboxes.write().await;
        if mailboxes.contains_key(&address) {
            return Err(BindError::AddressInUse(address));
        }

        let (tx, rx) = mpsc::channel(MAILBOX_SIZE);
        mailboxes.insert(address, tx);
        Ok(rx)
    }

    /// Remove the mailbox bound to `address`. Returns `false` if nothing was
    /// bound.
    pub async fn unbind(&self, address: Address) -> bool {
        self.mailboxes.write().await.remove(&address).is_some()
    }
}

impl Transport for LocalNetwork {
    fn send(&self, address: Address, envelope: String) -> BoxFuture<'_, Result<(), TransportError>> {
        async move {
            let tx = self.mailboxes.read().await.get(&address).cloned();
            let mut tx = tx.ok_or(TransportError::Unreachable(address))?;
            tx.send(envelope).await.map_err(|_| TransportError::Closed(address))
        }.boxed()
    }
}
