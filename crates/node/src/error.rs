//! Error types for node operations.

use std::sync::Arc;
use thiserror::Error;

/// Result type alias for node operations.
pub type Result<T> = std::result::Result<T, NodeError>;

/// Errors surfaced by the node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// No connection gateway was supplied.
    #[error("connection gateway not initialized")]
    GatewayMissing,

    /// No transport host was supplied.
    #[error("p2p host not initialized")]
    HostMissing,

    /// Configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Address or endpoint parsing failed.
    #[error(transparent)]
    Address(#[from] corelib::Error),

    /// The next hop is this node.
    #[error("cannot dial self - route through an intermediary instead of dialing the registry authority directly")]
    DialSelf,

    #[error("connection failed to {next_hop}: {source}")]
    Connect {
        next_hop: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to send request to {target}: {source}")]
    Send {
        target: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("initialize hook failed: {0}")]
    Initialize(#[source] anyhow::Error),

    /// Startup aborted; the cause is also in the error log.
    #[error("failed to start node: {0}")]
    Startup(Arc<NodeError>),

    /// The remote side answered with an error body.
    #[error("remote error: {0}")]
    Remote(#[from] corelib::ResponseError),

    #[error("failed to register with authority: {0}")]
    Registration(#[source] Box<NodeError>),

    #[error("failed to unregister: {0}")]
    Unregistration(#[source] Box<NodeError>),

    #[error("failed to close p2p host: {0}")]
    HostClose(#[source] anyhow::Error),

    /// Every failure met while stopping, in order.
    #[error("errors during shutdown: {}", join(.0))]
    Shutdown(Vec<Arc<NodeError>>),

    /// A start or stop future was dropped before it finished.
    #[error("{0} was cancelled before completing")]
    Cancelled(&'static str),

    #[error("advertise timeout")]
    AdvertiseTimeout,

    #[error("advertise failed: {0}")]
    Advertise(#[source] anyhow::Error),

    #[error("no parent configured")]
    NoParent,

    #[error("no parent transports configured")]
    NoParentTransports,
}

fn join(errors: &[Arc<NodeError>]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
