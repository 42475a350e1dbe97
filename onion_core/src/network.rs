/*! Bootstrap of a whole overlay inside one process.

Relays are started and registered in the directory first, then users. Every
actor gets its own mailbox and its own task draining it.
*/

use std::net::IpAddr;
use std::sync::Arc;

use futures::channel::mpsc;
use thiserror::Error;
use tokio::task::JoinHandle;

use onion_packet::address::*;

use crate::directory::*;
use crate::onion::client::Client;
use crate::onion::relay::Relay;
use crate::transport::*;

/// Error that can happen when launching a network.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Actor id doesn't map to an address.
    #[error("Invalid address: {0}")]
    Address(AddressError),
    /// Failed to bind a mailbox.
    #[error("Failed to bind mailbox: {0}")]
    Bind(BindError),
    /// Failed to register a relay.
    #[error("Failed to register relay: {0}")]
    Register(RegisterError),
}

/// How actors reach each other.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransportKind {
    /// In-process channels.
    Local,
    /// TCP connections to ports of a single host.
    Tcp(IpAddr),
}

/// Parameters of a network.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NetworkConfig {
    /// Number of relays, their ids are `0..relays`.
    pub relays: u32,
    /// Number of users, their ids are `0..users`.
    pub users: u32,
    /// Mapping of ids to addresses.
    pub address_space: AddressSpace,
    /// How envelopes are delivered.
    pub transport: TransportKind,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            relays: 5,
            users: 2,
            address_space: AddressSpace::default(),
            transport: TransportKind::Local,
        }
    }
}

/// Running network. Tasks of all actors are aborted when it's dropped.
pub struct Network {
    directory: Directory,
    relays: Vec<Relay>,
    users: Vec<Client>,
    tasks: Vec<JoinHandle<()>>,
}

impl Network {
    /// Directory all relays are registered in.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Running relays ordered by id.
    pub fn relays(&self) -> &[Relay] {
        &self.relays
    }

    /// Running users ordered by id.
    pub fn users(&self) -> &[Client] {
        &self.users
    }

    /// Relay with the given id.
    pub fn relay(&self, node_id: NodeId) -> Option<&Relay> {
        self.relays.get(node_id as usize)
    }

    /// User with the given id.
    pub fn user(&self, user_id: UserId) -> Option<&Client> {
        self.users.get(user_id as usize)
    }
}

impl Drop for Network {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

enum Binder {
    Local(LocalNetwork),
    Tcp(TcpTransport),
}

impl Binder {
    fn transport(&self) -> Arc<dyn Transport> {
        match self {
            Binder::Local(network) => Arc::new(network.clone()),
            Binder::Tcp(transport) => Arc::new(*transport),
        }
    }

    /// Bind a mailbox to `address`. TCP also returns the task of its listener.
    async fn bind(&self, address: Address) -> Result<(mpsc::Receiver<String>, Option<JoinHandle<()>>), BindError> {
        match self {
            Binder::Local(network) => network.bind(address).await.map(|rx| (rx, None)),
            Binder::Tcp(transport) => transport.bind(address).await
                .map(|(rx, listener_task)| (rx, Some(listener_task))),
        }
    }
}

/// Start all relays and users described by `config`.
pub async fn launch_network(config: &NetworkConfig) -> Result<Network, LaunchError> {
    let binder = match config.transport {
        TransportKind::Local => Binder::Local(LocalNetwork::new()),
        TransportKind::Tcp(host) => Binder::Tcp(TcpTransport::new(host)),
    };
    let transport = binder.transport();
    let address_space = config.address_space;

    // tasks started so far are aborted by drop if launching fails midway
    let mut network = Network {
        directory: Directory::new(),
        relays: Vec::with_capacity(config.relays as usize),
        users: Vec::with_capacity(config.users as usize),
        tasks: Vec::new(),
    };

    for node_id in 0..config.relays {
        let address = address_space.relay_address(node_id).map_err(LaunchError::Address)?;
        let (mailbox, listener_task) = binder.bind(address).await.map_err(LaunchError::Bind)?;
        network.tasks.extend(listener_task);
        let relay = Relay::new(node_id, transport.clone());
        network.directory.register(node_id, relay.public_key().clone()).await
            .map_err(LaunchError::Register)?;

        network.tasks.push(tokio::spawn(relay.clone().run(mailbox)));
        network.relays.push(relay);
    }

    for user_id in 0..config.users {
        let address = address_space.user_address(user_id).map_err(LaunchError::Address)?;
        let (mailbox, listener_task) = binder.bind(address).await.map_err(LaunchError::Bind)?;
        network.tasks.extend(listener_task);
        let client = Client::new(user_id, network.directory.clone(), transport.clone(), address_space);

        network.tasks.push(tokio::spawn(client.clone().run(mailbox)));
        network.users.push(client);
    }

    info!("Launched network of {} relays and {} users", network.relays.len(), network.users.len());

    Ok(network)
}
