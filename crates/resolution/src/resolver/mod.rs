//! Address resolver abstractions.
//!
//! A resolver rewrites one logical address into another, typically the next
//! hop that can make progress toward it (a parent, a relay, an authority).
//! Resolvers are tried in registration order by the
//! [`ResolverChain`](crate::chain::ResolverChain):
//!
//! - **PrefixResolver**: everything under a textual prefix goes to one next hop

pub mod prefix;

pub use prefix::PrefixResolver;

use async_trait::async_trait;
use corelib::LogicalAddress;

/// Trait for address resolvers.
///
/// Returning `None` from [`resolve`](AddressResolver::resolve) means "not
/// mine": the chain moves on to the next resolver. Resolvers never fail the
/// outer call.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (Send + Sync): one chain is shared by
/// every concurrent dispatch of a node.
#[async_trait]
pub trait AddressResolver: Send + Sync + 'static {
    /// Resolve an address, or `None` when this resolver has no opinion.
    async fn resolve(&self, address: &LogicalAddress) -> Option<LogicalAddress>;

    /// Whether this resolver can supply a dialable transport for `address`.
    fn supports_transport(&self, address: &LogicalAddress) -> bool;

    /// Resolver name (for logging/debugging).
    fn name(&self) -> &'static str;
}
