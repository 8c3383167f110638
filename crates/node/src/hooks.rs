//! Extension point for concrete node kinds.
//!
//! The core node knows nothing about what kind of node it is. A concrete
//! kind (a tool host, an agent, a registry) supplies its setup through
//! [`NodeHooks`]; the default does nothing.

use crate::node::CoreNode;
use async_trait::async_trait;

#[async_trait]
pub trait NodeHooks: Send + Sync {
    /// Runs during `start()` while the node is `Starting`. An error aborts
    /// startup and leaves the node in `Error`.
    ///
    /// Called with the lifecycle lock held: calling `start()` or `stop()`
    /// from here deadlocks. Dispatching is fine.
    async fn initialize(&self, node: &CoreNode) -> anyhow::Result<()> {
        tracing::debug!(address = %node.address(), "initializing core node");
        Ok(())
    }
}

/// Hooks for a plain core node.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl NodeHooks for NoopHooks {}
