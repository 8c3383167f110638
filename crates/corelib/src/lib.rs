//! Core library for overlay address routing.
//!
//! This crate provides the value types every other layer builds on:
//! - Logical addresses and their structural helpers
//! - Transport hints (structured endpoints or opaque strings)
//! - Content identifiers for network advertisement
//! - Node identity types (type, lifecycle state, methods)
//! - Request/response envelopes and dispatch options

pub mod address;
pub mod cid;
pub mod error;
pub mod message;
pub mod node;
pub mod transport;

pub use address::{LogicalAddress, REGISTRY_REGISTER, REGISTRY_ROOT, SCHEME};
pub use cid::ContentId;
pub use error::{Error, Result};
pub use message::{DispatchOptions, ErrorCode, Payload, Response, ResponseError, SendParams};
pub use node::{Dependency, MethodSpec, NodeState, NodeType};
pub use transport::{Endpoint, TransportHint};

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
