//! Address resolution for overlay routing.
//!
//! This crate turns a logical address into something dialable:
//! - Pluggable resolvers and the ordered, first-match-wins chain
//! - Static alias translation against the registry authority
//! - Transport selection for the next hop

pub mod chain;
pub mod locator;
pub mod registry;
pub mod resolver;

pub use chain::ResolverChain;
pub use locator::TransportLocator;
pub use registry::LookupMiss;
pub use resolver::{AddressResolver, PrefixResolver};
