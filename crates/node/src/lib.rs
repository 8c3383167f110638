//! Overlay node: request dispatch and lifecycle.
//!
//! This crate ties the address model and resolution layers to the
//! transport substrate:
//! - Collaborator interfaces for connections and the local host
//! - The core node: translate, connect, send, and start/stop
//! - Runtime state, counters and error log
//! - Configuration and tracing setup

pub mod config;
pub mod error;
pub mod gateway;
pub mod hooks;
pub mod logging;
pub mod node;
pub mod state;

pub use config::{NetworkConfig, NodeConfig};
pub use error::{NodeError, Result};
pub use gateway::{ConnectParams, Connection, ConnectionGateway, GatewayError, Host};
pub use hooks::{NodeHooks, NoopHooks};
pub use logging::init_tracing;
pub use node::{CoreNode, NodeBuilder, Translation, WhoAmI, ADVERTISE_TIMEOUT};
pub use state::{Counters, RuntimeState, TransitionGuard};
