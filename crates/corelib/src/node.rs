//! Node identity types.
//!
//! These describe a participant in the overlay: what kind of node it is,
//! where its lifecycle stands, and what methods it advertises. Heavy mutable
//! state (connections, counters, error log) lives in the node crate.

use crate::address::LogicalAddress;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of node participating in the overlay.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Registry authority: maps aliases to canonical addresses.
    Leader,
    Root,
    Node,
    Tool,
    Agent,
    Human,
    #[default]
    Unknown,
}

impl NodeType {
    pub fn is_registry_authority(&self) -> bool {
        matches!(self, NodeType::Leader)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Leader => "leader",
            NodeType::Root => "root",
            NodeType::Node => "node",
            NodeType::Tool => "tool",
            NodeType::Agent => "agent",
            NodeType::Human => "human",
            NodeType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a node.
///
/// ```text
/// Stopped -> Starting -> Running -> Stopping -> Stopped
///               |                      |
///               +------> Error <-------+
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeState {
    #[default]
    Stopped,
    Starting,
    Running,
    Stopping,
    Error,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeState::Stopped => "STOPPED",
            NodeState::Starting => "STARTING",
            NodeState::Running => "RUNNING",
            NodeState::Stopping => "STOPPING",
            NodeState::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Method a node exposes to callers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub returns: serde_json::Map<String, serde_json::Value>,
}

impl MethodSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }
}

/// Another node this node relies on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub address: LogicalAddress,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub optional: bool,
}
