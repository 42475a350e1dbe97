/*! Transport over TCP on a single host.

Address of an endpoint is the TCP port it listens on. Every envelope is sent
over a fresh connection as a single length delimited frame.
*/

use std::net::IpAddr;

use bytes::Bytes;
use futures::channel::mpsc;
use futures::future::{BoxFuture, FutureExt};
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_util::codec::{Framed, FramedRead, LengthDelimitedCodec};

use onion_packet::address::Address;

use super::*;

/// TCP port an address maps to.
pub fn address_port(address: Address) -> Option<u16> {
    u16::try_from(address.value()).ok()
}

/// Transport that connects to `host` on the port equal to the address.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TcpTransport {
    host: IpAddr,
}

impl TcpTransport {
    /// Create new `TcpTransport`.
    pub fn new(host: IpAddr) -> Self {
        TcpTransport { host }
    }

    /// Host all endpoints listen on.
    pub fn host(&self) -> IpAddr {
        self.host
    }

    /// Bind a listener for `address` and start accepting envelopes into a
    /// new mailbox. The listener is closed when the returned task is aborted.
    pub async fn bind(&self, address: Address) -> Result<(mpsc::Receiver<String>, JoinHandle<()>), BindError> {
        let port = address_port(address).ok_or(BindError::Unsupported(address))?;
        let listener = TcpListener::bind((self.host, port)).await.map_err(|e|
            if e.kind() == std::io::ErrorKind::AddrInUse {
                BindError::AddressInUse(address)
            } else {
                BindError::Io(e)
            }
        )?;

        let (tx, rx) = mpsc::channel(MAILBOX_SIZE);
        let listener_task = tokio::spawn(async move {
            if let Err(e) = tcp_listen(listener, tx).await {
                error!("Listener of {} stopped: {}", address, e);
            }
        });
        Ok((rx, listener_task))
    }
}

impl Transport for TcpTransport {
    fn send(&self, address: Address, envelope: String) -> BoxFuture<'_, Result<(), TransportError>> {
        async move {
            let port = address_port(address).ok_or(TransportError::Unreachable(address))?;
            let stream = TcpStream::connect((self.host, port)).await.map_err(|e|
                if e.kind() == std::io::ErrorKind::ConnectionRefused {
                    TransportError::Unreachable(address)
                } else {
                    TransportError::Io(e)
                }
            )?;

            let mut framed = Framed::new(stream, LengthDelimitedCodec::new());
            framed.send(Bytes::from(envelope)).await.map_err(TransportError::Io)?;
            SinkExt::<Bytes>::close(&mut framed).await.map_err(TransportError::Io)
        }.boxed()
    }
}

/// Accept connections on `listener` and put every received frame into
/// `mailbox`. Runs until the listener fails.
pub async fn tcp_listen(listener: TcpListener, mailbox: mpsc::Sender<String>) -> Result<(), std::io::Error> {
    loop {
        let (stream, addr) = listener.accept().await?;
        let mut mailbox = mailbox.clone();

        tokio::spawn(async move {
            let mut frames = FramedRead::new(stream, LengthDelimitedCodec::new());
            while let Some(frame) = frames.next().await {
                let frame = match frame {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!("Failed to read frame from {}: {}", addr, e);
                        break;
                    },
                };
                match String::from_utf8(frame.to_vec()) {
                    Ok(envelope) => if mailbox.send(envelope).await.is_err() {
                        break;
                    },
                    Err(_) => warn!("Dropping non UTF-8 frame from {}", addr),
                }
            }
        });
    }
}
