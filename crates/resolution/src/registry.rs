//! Requests to the registry authority and static alias translation.
//!
//! The registry maps human-assigned aliases (`o://alias`) to canonical
//! hierarchical addresses. This module builds the registry requests and
//! interprets the search reply; the node sends them through its ordinary
//! dispatch pipeline.
//!
//! Static translation of `o://alias/extra/path`:
//!
//! 1. search `o://leader/register` with `{staticAddress: "o://alias"}`
//! 2. take the first result's `address`, e.g. `o://canon`
//! 3. re-append the remainder: `o://canon/extra/path`
//! 4. keep the input's transport hints

use corelib::{LogicalAddress, REGISTRY_REGISTER, REGISTRY_ROOT};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

pub const SEARCH_METHOD: &str = "search";
pub const COMMIT_METHOD: &str = "commit";
pub const REMOVE_METHOD: &str = "remove";

/// Why a search reply produced no canonical address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupMiss {
    #[error("registry returned no results")]
    NoResults,
    #[error("malformed registry reply: {0}")]
    Malformed(String),
}

#[derive(Deserialize)]
struct SearchReply {
    data: Vec<SearchEntry>,
}

#[derive(Deserialize)]
struct SearchEntry {
    address: String,
}

/// Static translation only applies outside the registry root. The test is
/// the literal prefix one.
pub fn needs_static_translation(address: &LogicalAddress) -> bool {
    !address.is_under_prefix(REGISTRY_ROOT)
}

/// Registry endpoint for a lookup on behalf of `input`, carrying its hints.
pub fn search_address(input: &LogicalAddress) -> LogicalAddress {
    LogicalAddress::with_hints(REGISTRY_REGISTER, input.transports().to_vec())
}

/// Search parameters: the input's root is the lookup key.
pub fn search_params(input: &LogicalAddress) -> Value {
    json!({ "staticAddress": input.root().value() })
}

/// Registration parameters for `commit`.
pub fn commit_params(
    peer_id: &str,
    address: &LogicalAddress,
    transports: &[String],
    static_address: &LogicalAddress,
) -> Value {
    json!({
        "peerId": peer_id,
        "address": address.value(),
        "protocols": [],
        "transports": transports,
        "staticAddress": static_address.value(),
    })
}

/// Deregistration parameters for `remove`.
pub fn remove_params(peer_id: &str) -> Value {
    json!({ "peerId": peer_id })
}

/// Canonical address of the first search result.
pub fn canonical_from_reply(result: &Value) -> Result<String, LookupMiss> {
    let reply: SearchReply = serde_json::from_value(result.clone())
        .map_err(|e| LookupMiss::Malformed(e.to_string()))?;
    reply
        .data
        .into_iter()
        .next()
        .map(|entry| entry.address)
        .ok_or(LookupMiss::NoResults)
}

/// `canonical` plus every segment of `input` beyond its root, with the
/// input's hints carried over.
pub fn rewrite(input: &LogicalAddress, canonical: &str) -> LogicalAddress {
    let segments = input.path_segments();
    let value = if segments.len() > 1 {
        format!("{}/{}", canonical, segments[1..].join("/"))
    } else {
        canonical.to_string()
    };
    LogicalAddress::with_hints(value, input.transports().to_vec())
}
