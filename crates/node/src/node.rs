//! The core node.
//!
//! A [`CoreNode`] turns `(address, method, params)` into a delivered request:
//!
//! 1. static translation: rewrite an alias through the registry authority
//! 2. resolver chain: pick the next hop
//! 3. transport locator: attach the transports to dial
//! 4. connect through the gateway, send, close
//!
//! It also owns the lifecycle (`start`/`stop`, registration with the
//! authority) and the per-node counters and error log.

use crate::config::NodeConfig;
use crate::error::{NodeError, Result};
use crate::gateway::{ConnectParams, Connection, ConnectionGateway, GatewayError, Host};
use crate::hooks::{NodeHooks, NoopHooks};
use crate::state::{Counters, RuntimeState, TransitionGuard};
use corelib::{
    ContentId, Dependency, DispatchOptions, Endpoint, LogicalAddress, MethodSpec, NodeState, NodeType,
    Payload, Response, SendParams, TransportHint, REGISTRY_REGISTER,
};
use resolution::{registry, AddressResolver, ResolverChain, TransportLocator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Upper bound on a single content advertisement.
pub const ADVERTISE_TIMEOUT: Duration = Duration::from_secs(5);

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of address translation.
#[derive(Clone, Debug, PartialEq)]
pub struct Translation {
    /// What to dial, with transports attached. May be an intermediary.
    pub next_hop: LogicalAddress,
    /// Logical recipient presented to the remote peer.
    pub target: LogicalAddress,
}

/// Self-description returned to callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub address: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub description: String,
    pub methods: BTreeMap<String, MethodSpec>,
    pub success_count: u64,
    pub error_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_id: Option<String>,
    pub transports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
}

/// Assembles a [`CoreNode`] from its configuration and collaborators.
///
/// Resolvers can only be added here, so the chain is fixed before any
/// dispatch runs.
pub struct NodeBuilder {
    config: NodeConfig,
    resolvers: ResolverChain,
    gateway: Option<Arc<dyn ConnectionGateway>>,
    host: Option<Arc<dyn Host>>,
    hooks: Arc<dyn NodeHooks>,
}

impl NodeBuilder {
    pub fn new(config: NodeConfig) -> Self {
        Self {
            config,
            resolvers: ResolverChain::new(),
            gateway: None,
            host: None,
            hooks: Arc::new(NoopHooks),
        }
    }

    /// Append a resolver; resolvers are tried in the order added.
    pub fn with_resolver<R: AddressResolver>(mut self, resolver: R) -> Self {
        self.resolvers.add(resolver);
        self
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn ConnectionGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_host(mut self, host: Arc<dyn Host>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn NodeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Validate the configuration and build the node in `Stopped`.
    pub fn build(self) -> Result<CoreNode> {
        self.config.validate()?;

        let locator = TransportLocator::new(self.config.authority.clone(), self.config.node_type);
        let name = self.config.display_name();
        debug!(
            node = %name,
            resolvers = ?self.resolvers.names(),
            "building core node"
        );

        Ok(CoreNode {
            name,
            config: self.config,
            resolvers: self.resolvers,
            locator,
            gateway: self.gateway,
            host: self.host,
            hooks: self.hooks,
            state: RuntimeState::new(),
            lifecycle: Mutex::new(()),
        })
    }
}

/// A participant in the overlay.
pub struct CoreNode {
    /// `name:address`, used as the `node` field on log events.
    name: String,
    config: NodeConfig,
    resolvers: ResolverChain,
    locator: TransportLocator,
    gateway: Option<Arc<dyn ConnectionGateway>>,
    host: Option<Arc<dyn Host>>,
    hooks: Arc<dyn NodeHooks>,
    state: RuntimeState,
    /// Serialises `start` and `stop` end to end.
    lifecycle: Mutex<()>,
}

impl std::fmt::Debug for CoreNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreNode")
            .field("address", &self.config.address)
            .field("node_type", &self.config.node_type)
            .field("state", &self.state.state())
            .field("resolvers", &self.resolvers)
            .finish_non_exhaustive()
    }
}

impl CoreNode {
    pub fn builder(config: NodeConfig) -> NodeBuilder {
        NodeBuilder::new(config)
    }

    pub fn address(&self) -> &LogicalAddress {
        &self.config.address
    }

    pub fn display_name(&self) -> &str {
        &self.name
    }

    /// Alias published to the registry.
    pub fn static_address(&self) -> LogicalAddress {
        self.config.static_address()
    }

    pub fn node_type(&self) -> NodeType {
        self.config.node_type
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn resolvers(&self) -> &ResolverChain {
        &self.resolvers
    }

    pub fn state(&self) -> NodeState {
        self.state.state()
    }

    /// Snapshot of the error log, oldest first.
    pub fn errors(&self) -> Vec<Arc<NodeError>> {
        self.state.errors()
    }

    pub fn counters(&self) -> Counters {
        self.state.counters()
    }

    pub fn success_count(&self) -> u64 {
        self.counters().success
    }

    pub fn error_count(&self) -> u64 {
        self.counters().error
    }

    /// Peer identity of the host, if there is one.
    pub fn peer_id(&self) -> Option<String> {
        self.host.as_ref().map(|host| host.peer_id())
    }

    /// Own listen transports; empty without a host.
    pub fn transports(&self) -> Vec<TransportHint> {
        self.host
            .as_ref()
            .map(|host| host.listen_transports())
            .unwrap_or_default()
    }

    pub fn parent(&self) -> Option<&LogicalAddress> {
        self.config.parent.as_ref()
    }

    /// Structured transports of the configured parent.
    pub fn parent_transports(&self) -> Vec<Endpoint> {
        self.parent()
            .map(|parent| parent.structured_transports().into_iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Peer id carried by the parent's first structured transport.
    pub fn parent_peer_id(&self) -> Result<String> {
        let parent = self.parent().ok_or(NodeError::NoParent)?;
        let endpoint = parent
            .structured_transports()
            .into_iter()
            .next()
            .ok_or(NodeError::NoParentTransports)?;
        Ok(endpoint.peer_id()?.to_string())
    }

    pub fn whoami(&self) -> WhoAmI {
        let counters = self.counters();
        WhoAmI {
            address: self.address().value().to_string(),
            node_type: self.node_type(),
            description: self.config.description.clone(),
            methods: self.config.methods.clone(),
            success_count: counters.success,
            error_count: counters.error,
            peer_id: self.peer_id(),
            transports: self.transports().iter().map(ToString::to_string).collect(),
            dependencies: self.config.dependencies.clone(),
        }
    }

    /// Transports to dial for `address`.
    pub fn get_transports(&self, address: &LogicalAddress) -> Vec<TransportHint> {
        self.locator
            .transports_for(address, || self.transports())
    }

    /// Rewrite an alias into its canonical address through the registry.
    ///
    /// Never fails: any miss leaves the address as it was.
    pub async fn translate_static(&self, address: &LogicalAddress) -> LogicalAddress {
        self.translate_static_with(address, &DispatchOptions::default())
            .await
    }

    async fn translate_static_with(
        &self,
        address: &LogicalAddress,
        options: &DispatchOptions,
    ) -> LogicalAddress {
        if !registry::needs_static_translation(address) {
            return address.clone();
        }

        let search = registry::search_address(address);
        let lookup = DispatchOptions {
            no_index: true,
            timeout: options.timeout,
        };
        let reply = self
            .dispatch_boxed(
                &search,
                registry::SEARCH_METHOD,
                registry::search_params(address),
                lookup,
            )
            .await;

        let canonical = match reply {
            Ok(response) => match response.into_result() {
                Ok(result) => registry::canonical_from_reply(&result).map_err(|miss| miss.to_string()),
                Err(remote) => Err(remote.to_string()),
            },
            Err(err) => Err(err.to_string()),
        };

        match canonical {
            Ok(canonical) => {
                let translated = registry::rewrite(address, &canonical);
                debug!(%address, %translated, "static address translated");
                translated
            }
            Err(reason) => {
                warn!(
                    node = %self.name,
                    %address,
                    %reason,
                    "static address lookup missed, using address as-is"
                );
                address.clone()
            }
        }
    }

    /// Work out the target identity and the next hop for `address`.
    pub async fn translate(&self, address: &LogicalAddress) -> Translation {
        self.translate_with(address, &DispatchOptions::default())
            .await
    }

    async fn translate_with(&self, address: &LogicalAddress, options: &DispatchOptions) -> Translation {
        let target = self.translate_static_with(address, options).await;
        let resolved = self.resolvers.resolve(&target).await;
        let transports = self.get_transports(&resolved);
        let next_hop = resolved.with_transports(transports);

        debug!(
            %address,
            %target,
            %next_hop,
            transports = next_hop.transports().len(),
            "address translated"
        );
        Translation { next_hop, target }
    }

    /// Open a connection to `next_hop` on behalf of `target`.
    ///
    /// `options` reach the gateway as given, so its dial can honor the
    /// caller's deadline.
    pub async fn connect(
        &self,
        next_hop: &LogicalAddress,
        target: &LogicalAddress,
        options: &DispatchOptions,
    ) -> Result<Box<dyn Connection>> {
        let gateway = self.gateway.as_ref().ok_or(NodeError::GatewayMissing)?;
        let params = ConnectParams {
            target: target.clone(),
            next_hop: next_hop.clone(),
            caller: self.address().clone(),
            options: options.clone(),
        };

        gateway.connect(params).await.map_err(|err| match err {
            GatewayError::DialSelf => NodeError::DialSelf,
            GatewayError::Other(source) => NodeError::Connect {
                next_hop: next_hop.to_string(),
                source,
            },
        })
    }

    /// Deliver `method(params)` to `address` and return the raw response.
    ///
    /// Exactly one of the success/error counters moves per call. A response
    /// carrying a remote error still counts as a delivered call.
    pub async fn dispatch(
        &self,
        address: &LogicalAddress,
        method: &str,
        params: Value,
        options: DispatchOptions,
    ) -> Result<Response> {
        self.dispatch_boxed(address, method, params, options).await
    }

    // Boxed: static translation dispatches the registry search through here.
    fn dispatch_boxed<'a>(
        &'a self,
        address: &'a LogicalAddress,
        method: &'a str,
        params: Value,
        options: DispatchOptions,
    ) -> BoxFuture<'a, Result<Response>> {
        Box::pin(async move {
            let outcome = self.dispatch_once(address, method, params, &options).await;
            self.record_outcome(outcome.is_ok());
            if let Err(err) = &outcome {
                debug!(node = %self.name, %address, method, error = %err, "dispatch failed");
            }
            outcome
        })
    }

    async fn dispatch_once(
        &self,
        address: &LogicalAddress,
        method: &str,
        params: Value,
        options: &DispatchOptions,
    ) -> Result<Response> {
        let Translation { next_hop, target } = self.translate_with(address, options).await;
        let connection = self.connect(&next_hop, &target, options).await?;

        let request = SendParams {
            address: target.value().to_string(),
            payload: Payload {
                method: method.to_string(),
                params,
            },
        };
        let sent = connection.send(request, options).await;

        if let Err(err) = connection.close().await {
            warn!(node = %self.name, %next_hop, error = %err, "failed to close connection");
        }

        sent.map_err(|source| NodeError::Send {
            target: target.to_string(),
            source,
        })
    }

    fn record_outcome(&self, success: bool) {
        self.state.record_outcome(success);

        if self.config.metrics {
            let node = self.address().value().to_string();
            if success {
                metrics::counter!("oroute_dispatch_success_total", "node" => node).increment(1);
            } else {
                metrics::counter!("oroute_dispatch_error_total", "node" => node).increment(1);
            }
        }
    }

    async fn call_registry(&self, method: &str, params: Value) -> Result<Value> {
        let register = LogicalAddress::new(REGISTRY_REGISTER);
        let response = self
            .dispatch(&register, method, params, DispatchOptions::no_index())
            .await?;
        Ok(response.into_result()?)
    }

    async fn commit(&self) -> Result<Value> {
        let peer_id = self.peer_id().ok_or(NodeError::HostMissing)?;
        let transports: Vec<String> = self.transports().iter().map(ToString::to_string).collect();
        let params = registry::commit_params(
            &peer_id,
            self.address(),
            &transports,
            &self.static_address(),
        );
        self.call_registry(registry::COMMIT_METHOD, params).await
    }

    async fn remove(&self) -> Result<Value> {
        let peer_id = self.peer_id().ok_or(NodeError::HostMissing)?;
        self.call_registry(registry::REMOVE_METHOD, registry::remove_params(&peer_id))
            .await
    }

    fn skip_registry(&self, action: &str) -> bool {
        if self.node_type().is_registry_authority() {
            debug!(address = %self.address(), action, "node is the registry authority, skipping");
            return true;
        }
        if self.locator.authority().is_none() {
            warn!(address = %self.address(), action, "no authority configured, skipping");
            return true;
        }
        false
    }

    /// Publish this node with the registry authority.
    pub async fn register(&self) -> Result<()> {
        if self.skip_registry("register") {
            return Ok(());
        }

        self.commit()
            .await
            .map_err(|err| NodeError::Registration(Box::new(err)))?;
        debug!(address = %self.address(), "registered with authority");
        Ok(())
    }

    /// Remove this node from the registry authority.
    pub async fn unregister(&self) -> Result<()> {
        if self.skip_registry("unregister") {
            return Ok(());
        }

        match self.remove().await {
            Ok(_) => {
                debug!(address = %self.address(), "unregistered from authority");
                Ok(())
            }
            Err(err) => {
                warn!(address = %self.address(), error = %err, "failed to unregister");
                Err(NodeError::Unregistration(Box::new(err)))
            }
        }
    }

    /// Announce `cid` through the host, giving up after [`ADVERTISE_TIMEOUT`].
    pub async fn advertise_value(&self, cid: &ContentId) -> Result<()> {
        let host = self.host.as_ref().ok_or(NodeError::HostMissing)?;
        debug!(%cid, "advertising content identifier");

        match tokio::time::timeout(ADVERTISE_TIMEOUT, host.advertise(cid)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(NodeError::Advertise(err)),
            Err(_) => Err(NodeError::AdvertiseTimeout),
        }
    }

    /// Advertise the node address and its static alias. Failures are logged.
    pub async fn advertise_to_network(&self) {
        let mut addresses = vec![self.address().clone()];
        let static_address = self.static_address();
        if static_address != *self.address() {
            addresses.push(static_address);
        }

        for address in addresses {
            let outcome = match address.content_identifier() {
                Ok(cid) => self.advertise_value(&cid).await,
                Err(err) => Err(err.into()),
            };
            match outcome {
                Ok(()) => debug!(%address, "advertised address"),
                Err(err) => warn!(%address, error = %err, "failed to advertise address"),
            }
        }
    }

    /// Run the initialize hook, register, and move to `Running`.
    ///
    /// Only acts from `Stopped`; anywhere else it logs and returns `Ok`.
    /// Dropping the future part way leaves the node in `Error`.
    pub async fn start(&self) -> Result<()> {
        let _lifecycle = self.lifecycle.lock().await;

        let current = self.state();
        if current != NodeState::Stopped {
            warn!(node = %self.name, state = %current, "node is not stopped, skipping start");
            return Ok(());
        }

        info!(node = %self.name, node_type = %self.node_type(), "starting node");
        let transition = TransitionGuard::enter(&self.state, NodeState::Starting, "start");

        if let Err(source) = self.hooks.initialize(self).await {
            let err = Arc::new(NodeError::Initialize(source));
            error!(node = %self.name, error = %err, "failed to start node");
            self.state.fail(NodeState::Error, &[Arc::clone(&err)]);
            transition.disarm();
            return Err(NodeError::Startup(err));
        }

        if let Err(err) = self.register().await {
            error!(node = %self.name, error = %err, "failed to register node");
        }

        self.state.set_state(NodeState::Running);
        transition.disarm();
        info!(node = %self.name, "node started");
        Ok(())
    }

    /// Unregister, close the host, and move to `Stopped`.
    ///
    /// Every failure is recorded; if there were any the node ends in
    /// `Error` and they come back aggregated.
    pub async fn stop(&self) -> Result<()> {
        let _lifecycle = self.lifecycle.lock().await;

        let previous = self.state();
        info!(node = %self.name, state = %previous, "stopping node");
        let transition = TransitionGuard::enter(&self.state, NodeState::Stopping, "stop");

        let mut failures = Vec::new();

        if previous == NodeState::Running {
            if let Err(err) = self.unregister().await {
                failures.push(Arc::new(err));
            }
        }

        if let Some(host) = &self.host {
            if let Err(source) = host.close().await {
                failures.push(Arc::new(NodeError::HostClose(source)));
            }
        }

        if failures.is_empty() {
            self.state.set_state(NodeState::Stopped);
            transition.disarm();
            info!(node = %self.name, "node stopped");
            return Ok(());
        }

        self.state.fail(NodeState::Error, &failures);
        transition.disarm();
        let err = NodeError::Shutdown(failures);
        error!(node = %self.name, error = %err, "node stopped with errors");
        Err(err)
    }
}
