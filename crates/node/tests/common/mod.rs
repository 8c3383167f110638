//! In-memory collaborators shared by the node integration tests.
//!
//! `MemoryGateway` plays both the transport substrate and the registry
//! authority: connections to any next hop succeed unless told otherwise, and
//! `search`/`commit`/`remove` calls are answered from a `DashMap`.

#![allow(dead_code)]

use async_trait::async_trait;
use corelib::{
    ContentId, DispatchOptions, LogicalAddress, NodeType, Response, ResponseError, SendParams,
    TransportHint,
};
use dashmap::{DashMap, DashSet};
use node::{
    ConnectParams, Connection, ConnectionGateway, CoreNode, GatewayError, Host, NodeConfig,
    NodeHooks,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const AUTHORITY_TRANSPORT: &str =
    "/ip4/10.0.0.1/tcp/4001/p2p/QmNnooDu7bfjPFoTZYxMNLWUQJyrVwtbZg5gBMjTezGAJN";
pub const HOST_PEER_ID: &str = "QmSelf";
pub const HOST_TRANSPORT: &str = "/ip4/127.0.0.1/tcp/5000";

/// One request that reached a connection.
#[derive(Clone, Debug)]
pub struct Call {
    pub next_hop: LogicalAddress,
    pub target: String,
    pub method: String,
    pub params: Value,
    pub options: DispatchOptions,
}

#[derive(Default)]
struct Shared {
    aliases: DashMap<String, String>,
    registrations: DashMap<String, Value>,
    unreachable: DashSet<String>,
    rejected_methods: DashSet<String>,
    connects: Mutex<Vec<ConnectParams>>,
    calls: Mutex<Vec<Call>>,
    dial_self: AtomicBool,
    fail_send: AtomicBool,
    closes: AtomicUsize,
    next_id: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct MemoryGateway {
    shared: Arc<Shared>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_alias(&self, alias: &str, canonical: &str) {
        self.shared
            .aliases
            .insert(alias.to_string(), canonical.to_string());
    }

    /// Refuse connections whose next hop has this value.
    pub fn make_unreachable(&self, next_hop: &str) {
        self.shared.unreachable.insert(next_hop.to_string());
    }

    /// Answer calls to `method` with a remote error response.
    pub fn reject_method(&self, method: &str) {
        self.shared.rejected_methods.insert(method.to_string());
    }

    pub fn set_dial_self(&self, on: bool) {
        self.shared.dial_self.store(on, Ordering::SeqCst);
    }

    pub fn set_fail_send(&self, on: bool) {
        self.shared.fail_send.store(on, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.shared.calls.lock().clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method)
            .collect()
    }

    pub fn connects(&self) -> Vec<ConnectParams> {
        self.shared.connects.lock().clone()
    }

    pub fn closes(&self) -> usize {
        self.shared.closes.load(Ordering::SeqCst)
    }

    pub fn registration(&self, peer_id: &str) -> Option<Value> {
        self.shared
            .registrations
            .get(peer_id)
            .map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl ConnectionGateway for MemoryGateway {
    async fn connect(&self, params: ConnectParams) -> Result<Box<dyn Connection>, GatewayError> {
        self.shared.connects.lock().push(params.clone());

        if self.shared.dial_self.load(Ordering::SeqCst) {
            return Err(GatewayError::DialSelf);
        }
        if self.shared.unreachable.contains(params.next_hop.value()) {
            return Err(anyhow::anyhow!("no route to {}", params.next_hop).into());
        }

        Ok(Box::new(MemoryConnection {
            shared: Arc::clone(&self.shared),
            next_hop: params.next_hop,
        }))
    }
}

struct MemoryConnection {
    shared: Arc<Shared>,
    next_hop: LogicalAddress,
}

impl MemoryConnection {
    fn answer(&self, method: &str, params: &Value, target: &str) -> Value {
        match method {
            "search" => {
                let key = params["staticAddress"].as_str().unwrap_or_default();
                let data: Vec<Value> = self
                    .shared
                    .aliases
                    .get(key)
                    .map(|canonical| vec![json!({ "address": canonical.value() })])
                    .unwrap_or_default();
                json!({ "data": data })
            }
            "commit" => {
                let peer_id = params["peerId"].as_str().unwrap_or_default().to_string();
                let address = params["address"].as_str().unwrap_or_default();
                let alias = params["staticAddress"].as_str().unwrap_or_default();
                if !alias.is_empty() && alias != address {
                    self.shared
                        .aliases
                        .insert(alias.to_string(), address.to_string());
                }
                self.shared.registrations.insert(peer_id, params.clone());
                json!({ "success": true })
            }
            "remove" => {
                let peer_id = params["peerId"].as_str().unwrap_or_default();
                let removed = self.shared.registrations.remove(peer_id).is_some();
                json!({ "success": removed })
            }
            _ => json!({ "target": target, "method": method }),
        }
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn send(&self, params: SendParams, options: &DispatchOptions) -> anyhow::Result<Response> {
        if self.shared.fail_send.load(Ordering::SeqCst) {
            anyhow::bail!("stream reset");
        }

        let method = params.payload.method.clone();
        self.shared.calls.lock().push(Call {
            next_hop: self.next_hop.clone(),
            target: params.address.clone(),
            method: method.clone(),
            params: params.payload.params.clone(),
            options: options.clone(),
        });

        let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        if self.shared.rejected_methods.contains(&method) {
            return Ok(Response::err(
                id,
                ResponseError::method_not_found(&method),
            ));
        }
        let result = self.answer(&method, &params.payload.params, &params.address);
        Ok(Response::ok(id, result))
    }

    async fn close(&self) -> anyhow::Result<()> {
        self.shared.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Host with a fixed identity that records what it advertises.
pub struct MemoryHost {
    transports: Vec<TransportHint>,
    advertised: Mutex<Vec<String>>,
    fail_advertise: AtomicBool,
    fail_close: AtomicBool,
    slow_close: AtomicBool,
    closes: AtomicUsize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            transports: vec![TransportHint::parse(HOST_TRANSPORT)],
            advertised: Mutex::new(Vec::new()),
            fail_advertise: AtomicBool::new(false),
            fail_close: AtomicBool::new(false),
            slow_close: AtomicBool::new(false),
            closes: AtomicUsize::new(0),
        }
    }

    pub fn set_fail_advertise(&self, on: bool) {
        self.fail_advertise.store(on, Ordering::SeqCst);
    }

    pub fn set_fail_close(&self, on: bool) {
        self.fail_close.store(on, Ordering::SeqCst);
    }

    /// Make `close` take 20ms.
    pub fn set_slow_close(&self, on: bool) {
        self.slow_close.store(on, Ordering::SeqCst);
    }

    pub fn advertised(&self) -> Vec<String> {
        self.advertised.lock().clone()
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Host for MemoryHost {
    fn peer_id(&self) -> String {
        HOST_PEER_ID.to_string()
    }

    fn listen_transports(&self) -> Vec<TransportHint> {
        self.transports.clone()
    }

    async fn advertise(&self, cid: &ContentId) -> anyhow::Result<()> {
        if self.fail_advertise.load(Ordering::SeqCst) {
            anyhow::bail!("routing table empty");
        }
        self.advertised.lock().push(cid.to_string());
        Ok(())
    }

    async fn close(&self) -> anyhow::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.slow_close.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        if self.fail_close.load(Ordering::SeqCst) {
            anyhow::bail!("listener still bound");
        }
        Ok(())
    }
}

/// Initialize hook that always fails.
pub struct FailingHooks;

#[async_trait]
impl NodeHooks for FailingHooks {
    async fn initialize(&self, _node: &CoreNode) -> anyhow::Result<()> {
        anyhow::bail!("init boom")
    }
}

/// Initialize hook that counts its runs and yields for a while.
#[derive(Default)]
pub struct CountingHooks {
    pub runs: AtomicUsize,
}

#[async_trait]
impl NodeHooks for CountingHooks {
    async fn initialize(&self, _node: &CoreNode) -> anyhow::Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(())
    }
}

pub fn authority() -> LogicalAddress {
    LogicalAddress::with_hints("o://leader", vec![TransportHint::parse(AUTHORITY_TRANSPORT)])
}

/// Config for an agent at `address` routed through the in-memory authority.
pub fn agent_config(address: &str) -> NodeConfig {
    let mut config = NodeConfig::new(LogicalAddress::new(address), NodeType::Agent);
    config.authority = Some(authority());
    config
}

pub fn build_node(config: NodeConfig, gateway: &MemoryGateway, host: &Arc<MemoryHost>) -> CoreNode {
    CoreNode::builder(config)
        .with_gateway(Arc::new(gateway.clone()))
        .with_host(Arc::clone(host) as Arc<dyn Host>)
        .build()
        .unwrap()
}
