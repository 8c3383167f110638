//! Transport locator.
//!
//! Decides which transports to dial for a resolved address. Strict
//! precedence:
//!
//! 1. hints already on the address
//! 2. our own listen transports, if we are the registry authority and no
//!    authority is configured
//! 3. the configured authority's hints
//! 4. nothing

use corelib::{LogicalAddress, NodeType, TransportHint};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct TransportLocator {
    authority: Option<LogicalAddress>,
    node_type: NodeType,
}

impl TransportLocator {
    pub fn new(authority: Option<LogicalAddress>, node_type: NodeType) -> Self {
        Self {
            authority,
            node_type,
        }
    }

    pub fn authority(&self) -> Option<&LogicalAddress> {
        self.authority.as_ref()
    }

    /// Transports for `address`. `own_transports` is only called when this
    /// node is the authority it needs to route through.
    pub fn transports_for<F>(&self, address: &LogicalAddress, own_transports: F) -> Vec<TransportHint>
    where
        F: FnOnce() -> Vec<TransportHint>,
    {
        if address.has_transports() {
            return address.transports().to_vec();
        }

        debug!(%address, "no transports on address, searching within network");
        match &self.authority {
            Some(authority) => authority.transports().to_vec(),
            None if self.node_type.is_registry_authority() => {
                debug!("node is the registry authority, using own transports");
                own_transports()
            }
            None => {
                warn!(%address, "not within a network, cannot route without an authority");
                Vec::new()
            }
        }
    }
}
