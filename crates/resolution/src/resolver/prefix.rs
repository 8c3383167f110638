//! Prefix resolver.
//!
//! Routes every address under a textual prefix to one fixed next hop. This
//! is the building block for hierarchical routing: a child node that only
//! knows its parent registers `PrefixResolver::new("o://", parent)`, a node
//! fronting a subtree registers the subtree root.
//!
//! The prefix test is the address's literal one, so `o://leader` also
//! captures `o://leadership`. Register a trailing `/` to scope it to a
//! subtree.

use crate::resolver::AddressResolver;
use async_trait::async_trait;
use corelib::LogicalAddress;

/// Prefix resolver: addresses under `prefix` resolve to `next_hop`.
///
/// # Example
///
/// ```rust
/// use corelib::LogicalAddress;
/// use resolution::PrefixResolver;
///
/// let resolver = PrefixResolver::new("o://team/", LogicalAddress::new("o://team"));
/// ```
#[derive(Debug, Clone)]
pub struct PrefixResolver {
    prefix: String,
    next_hop: LogicalAddress,
}

impl PrefixResolver {
    pub fn new(prefix: impl Into<String>, next_hop: LogicalAddress) -> Self {
        Self {
            prefix: prefix.into(),
            next_hop,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn next_hop(&self) -> &LogicalAddress {
        &self.next_hop
    }

    fn matches(&self, address: &LogicalAddress) -> bool {
        address.is_under_prefix(&self.prefix)
    }
}

#[async_trait]
impl AddressResolver for PrefixResolver {
    async fn resolve(&self, address: &LogicalAddress) -> Option<LogicalAddress> {
        if self.matches(address) {
            Some(self.next_hop.clone())
        } else {
            None
        }
    }

    fn supports_transport(&self, address: &LogicalAddress) -> bool {
        self.matches(address) && self.next_hop.has_transports()
    }

    fn name(&self) -> &'static str {
        "PrefixResolver"
    }
}
