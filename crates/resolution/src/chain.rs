//! Ordered resolver chain.
//!
//! # Algorithm
//!
//! 1. Try each resolver in registration order
//! 2. The first one returning a match wins immediately (no merging)
//! 3. If none match, the input comes back unchanged
//!
//! Resolution is total: it never fails, it only enriches. Resolvers are
//! appended at configuration time; the chain is read-only once dispatching
//! begins (`add` takes `&mut self`, so the borrow checker enforces that for
//! any chain shared behind `&`).

use crate::resolver::AddressResolver;
use corelib::LogicalAddress;
use tracing::debug;

#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn AddressResolver>>,
}

impl ResolverChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver; it is tried after every resolver added before it.
    pub fn add<R: AddressResolver>(&mut self, resolver: R) {
        self.resolvers.push(Box::new(resolver));
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Resolver names in the order they are tried.
    pub fn names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// First match wins; no match returns a copy of `address`.
    pub async fn resolve(&self, address: &LogicalAddress) -> LogicalAddress {
        for resolver in &self.resolvers {
            if let Some(resolved) = resolver.resolve(address).await {
                debug!(
                    resolver = resolver.name(),
                    from = %address,
                    to = %resolved,
                    "address resolved"
                );
                return resolved;
            }
        }
        address.clone()
    }

    /// True if any resolver supports a transport for `address`. Every
    /// resolver is consulted.
    pub fn supports_transport(&self, address: &LogicalAddress) -> bool {
        self.resolvers
            .iter()
            .fold(false, |acc, r| r.supports_transport(address) | acc)
    }
}

impl std::fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverChain")
            .field("resolvers", &self.names())
            .finish()
    }
}
