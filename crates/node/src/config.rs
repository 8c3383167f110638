//! Node configuration.
//!
//! Configuration is plain serde data, loaded from JSON. Every field has a
//! default so a config file only needs what it overrides.

use crate::error::{NodeError, Result};
use corelib::{Dependency, Endpoint, LogicalAddress, MethodSpec, NodeType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Settings handed to the transport host collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkConfig {
    pub listeners: Vec<String>,
    pub bootstrap_peers: Vec<String>,
    pub enable_relay: bool,
    pub enable_dht: bool,
    pub enable_pubsub: bool,
    pub dht_protocol_prefix: String,
    pub k_bucket_size: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listeners: vec!["/ip4/0.0.0.0/tcp/0".to_string()],
            bootstrap_peers: Vec::new(),
            enable_relay: true,
            enable_dht: true,
            enable_pubsub: true,
            dht_protocol_prefix: "/ipfs/kad/1.0.0".to_string(),
            k_bucket_size: 20,
        }
    }
}

impl NetworkConfig {
    /// Every listener and bootstrap peer must be a structured endpoint.
    pub fn validate(&self) -> Result<()> {
        for addr in self.listeners.iter().chain(self.bootstrap_peers.iter()) {
            Endpoint::parse(addr)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeConfig {
    pub address: LogicalAddress,
    /// Human-assigned alias published to the registry; defaults to `address`.
    pub static_address: Option<LogicalAddress>,
    /// Registry authority to route through when an address has no hints.
    pub authority: Option<LogicalAddress>,
    pub parent: Option<LogicalAddress>,
    pub node_type: NodeType,
    pub name: Option<String>,
    pub description: String,
    pub methods: BTreeMap<String, MethodSpec>,
    pub dependencies: Vec<Dependency>,
    /// Also report dispatch outcomes through the `metrics` facade.
    pub metrics: bool,
    pub network: NetworkConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            address: LogicalAddress::new("o://node"),
            static_address: None,
            authority: None,
            parent: None,
            node_type: NodeType::Unknown,
            name: None,
            description: String::new(),
            methods: BTreeMap::new(),
            dependencies: Vec::new(),
            metrics: false,
            network: NetworkConfig::default(),
        }
    }
}

impl NodeConfig {
    pub fn new(address: LogicalAddress, node_type: NodeType) -> Self {
        Self {
            address,
            node_type,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: NodeConfig =
            serde_json::from_str(json).map_err(|e| NodeError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| NodeError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }

    /// Addresses must carry the scheme; network endpoints must parse.
    pub fn validate(&self) -> Result<()> {
        let addresses = std::iter::once(&self.address)
            .chain(self.static_address.iter())
            .chain(self.authority.iter())
            .chain(self.parent.iter());
        for address in addresses {
            if !address.validate() {
                return Err(corelib::Error::InvalidAddress(address.to_string()).into());
            }
        }
        self.network.validate()
    }

    /// The alias to register, falling back to the node address.
    pub fn static_address(&self) -> LogicalAddress {
        self.static_address
            .clone()
            .unwrap_or_else(|| self.address.clone())
    }

    /// Name used in log fields: `name:address` or just the address.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => format!("{}:{}", name, self.address),
            None => self.address.to_string(),
        }
    }
}
