//! Collaborator interfaces onto the transport substrate.
//!
//! The node never touches sockets. It asks a [`ConnectionGateway`] for a
//! [`Connection`] to a next hop, and a [`Host`] for its own identity, its
//! listen transports, content advertisement and shutdown.

use async_trait::async_trait;
use corelib::{ContentId, DispatchOptions, LogicalAddress, Response, SendParams, TransportHint};
use thiserror::Error;

/// What the gateway needs to open a connection.
#[derive(Clone, Debug)]
pub struct ConnectParams {
    /// Logical recipient presented to the remote peer.
    pub target: LogicalAddress,
    /// Dialing target, carrying the transports to use.
    pub next_hop: LogicalAddress,
    /// Address of the calling node.
    pub caller: LogicalAddress,
    /// The caller's options; `timeout` bounds dialing as well as the send.
    pub options: DispatchOptions,
}

/// Gateway failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The next hop resolved to this very node.
    #[error("Can not dial self")]
    DialSelf,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Live connection to a next hop.
///
/// The node always calls [`close`](Connection::close) after a send, whatever
/// the outcome. If the dispatch future is dropped mid-flight `close` never
/// runs, so implementations should also release resources on `Drop`.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Deliver `params` to its logical recipient. `options.timeout` is
    /// advisory; honoring it is up to the implementation.
    async fn send(&self, params: SendParams, options: &DispatchOptions) -> anyhow::Result<Response>;

    async fn close(&self) -> anyhow::Result<()>;
}

/// Source of connections.
#[async_trait]
pub trait ConnectionGateway: Send + Sync {
    async fn connect(&self, params: ConnectParams) -> Result<Box<dyn Connection>, GatewayError>;
}

/// The local transport host.
#[async_trait]
pub trait Host: Send + Sync {
    /// Peer identity of this host.
    fn peer_id(&self) -> String;

    /// Externally reachable listen transports.
    fn listen_transports(&self) -> Vec<TransportHint>;

    /// Announce a content identifier to the network.
    async fn advertise(&self, cid: &ContentId) -> anyhow::Result<()>;

    /// Shut the host down.
    async fn close(&self) -> anyhow::Result<()>;
}
