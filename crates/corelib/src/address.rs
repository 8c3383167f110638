//! Logical addresses.
//!
//! An address is an opaque `o://seg/seg/...` string plus an ordered list of
//! transport hints. Structure is parsed on demand and never cached: the
//! namespace is shallow and addresses must round-trip byte for byte through
//! network messages.
//!
//! Every operation that "changes" an address returns a new value; the
//! receiver is never mutated.

use crate::cid::ContentId;
use crate::error::{Error, Result};
use crate::transport::{Endpoint, TransportHint};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Scheme every valid address starts with.
pub const SCHEME: &str = "o://";

/// Protocol form prefix (`/o/...`), used when an address is embedded in an
/// endpoint-style string.
pub const PROTOCOL_PREFIX: &str = "/o/";

/// Root of the naming authority.
pub const REGISTRY_ROOT: &str = "o://leader";

/// Registry service endpoint used for alias search, commit and remove.
pub const REGISTRY_REGISTER: &str = "o://leader/register";

/// Root segment naming the authority.
const REGISTRY_SEGMENT: &str = "leader";

/// Second-segment markers identifying a capability address.
const CAPABILITY_MARKERS: [&str; 2] = ["tool", "tools"];

/// Hierarchical logical address with optional transport hints.
///
/// Equality and hashing look at the textual value only; hints are routing
/// metadata and do not change identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogicalAddress {
    value: String,
    #[serde(default)]
    transports: Vec<TransportHint>,
}

impl LogicalAddress {
    /// Build an address without validating it.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            transports: Vec::new(),
        }
    }

    /// Build an address carrying the given hints, in order.
    pub fn with_hints(value: impl Into<String>, transports: Vec<TransportHint>) -> Self {
        Self {
            value: value.into(),
            transports,
        }
    }

    /// Parse and validate an address.
    pub fn parse(value: &str) -> Result<Self> {
        if !value.starts_with(SCHEME) {
            return Err(Error::InvalidAddress(value.to_string()));
        }
        Ok(Self::new(value))
    }

    /// Rebuild an address from its protocol form (`/o/a/b` -> `o://a/b`).
    pub fn from_protocol(protocol: &str) -> Self {
        Self::new(protocol.replacen(PROTOCOL_PREFIX, SCHEME, 1))
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn transports(&self) -> &[TransportHint] {
        &self.transports
    }

    pub fn has_transports(&self) -> bool {
        !self.transports.is_empty()
    }

    /// True iff the value carries the scheme prefix.
    pub fn validate(&self) -> bool {
        self.value.starts_with(SCHEME)
    }

    /// The value with the scheme stripped.
    pub fn paths(&self) -> &str {
        self.value.strip_prefix(SCHEME).unwrap_or(&self.value)
    }

    /// Protocol form (`o://a/b` -> `/o/a/b`).
    pub fn protocol(&self) -> String {
        self.value.replacen(SCHEME, PROTOCOL_PREFIX, 1)
    }

    /// Scheme plus first segment. An address with no path is its own root.
    pub fn root(&self) -> LogicalAddress {
        match self.path_segments().first() {
            Some(first) => Self::new(format!("{}{}", SCHEME, first)),
            None => Self::new(self.value.clone()),
        }
    }

    /// `/`-split segments after the scheme; empty when there is no path.
    pub fn path_segments(&self) -> Vec<&str> {
        let paths = self.paths();
        if paths.is_empty() {
            return Vec::new();
        }
        paths.split('/').collect()
    }

    /// Append one segment, keeping exactly one `/` at the join. Hints are
    /// carried over.
    pub fn with_appended_path(&self, segment: &str) -> LogicalAddress {
        let base = self.value.strip_suffix('/').unwrap_or(&self.value);
        let segment = segment.strip_prefix('/').unwrap_or(segment);
        Self::with_hints(format!("{}/{}", base, segment), self.transports.clone())
    }

    /// Concatenate `child`'s path under `parent`.
    ///
    /// With an empty parent path the child's path is appended directly to
    /// the parent's raw value.
    pub fn child_of(parent: &LogicalAddress, child: &LogicalAddress) -> LogicalAddress {
        let parent_path = parent.paths();
        let child_path = child.paths();
        if !parent_path.is_empty() {
            Self::new(format!("{}{}/{}", SCHEME, parent_path, child_path))
        } else {
            Self::new(format!("{}/{}", parent.value, child_path))
        }
    }

    /// Literal textual prefix test. Not segment aware: `o://leader` is a
    /// prefix of `o://leadership`.
    pub fn is_under_prefix(&self, prefix: &str) -> bool {
        self.value.starts_with(prefix)
    }

    /// Copy of this address with its hints replaced.
    pub fn with_transports(&self, transports: Vec<TransportHint>) -> LogicalAddress {
        Self::with_hints(self.value.clone(), transports)
    }

    /// Structured endpoint hints, in order.
    pub fn structured_transports(&self) -> Vec<&Endpoint> {
        self.transports.iter().filter_map(|t| t.as_endpoint()).collect()
    }

    /// Opaque string hints, in order.
    pub fn opaque_transports(&self) -> Vec<&str> {
        self.transports.iter().filter_map(|t| t.as_opaque()).collect()
    }

    /// Every hint rendered as a string, in order.
    pub fn all_transports(&self) -> Vec<String> {
        self.transports.iter().map(|t| t.to_string()).collect()
    }

    /// Content identifier of `{"address": value}`; advertisement only.
    pub fn content_identifier(&self) -> Result<ContentId> {
        ContentId::for_address(&self.value)
    }

    /// Root segment names the registry authority.
    pub fn is_registry_address(&self) -> bool {
        self.path_segments().first() == Some(&REGISTRY_SEGMENT)
    }

    /// Second segment is a `tool`/`tools` marker.
    pub fn is_capability_address(&self) -> bool {
        let segments = self.path_segments();
        segments.len() > 1 && CAPABILITY_MARKERS.contains(&segments[1])
    }

    /// Third segment of a capability address.
    pub fn capability_name(&self) -> Option<&str> {
        if !self.is_capability_address() {
            return None;
        }
        self.path_segments().get(2).copied()
    }

    /// Last segment, the default method name for a call to this address.
    pub fn final_method_segment(&self) -> Option<&str> {
        self.path_segments().last().copied()
    }
}

impl PartialEq for LogicalAddress {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for LogicalAddress {}

impl Hash for LogicalAddress {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl fmt::Display for LogicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for LogicalAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root() {
        assert_eq!(LogicalAddress::new("o://a/b/c").root().value(), "o://a");
        assert_eq!(LogicalAddress::new("o://a").root().value(), "o://a");
        assert_eq!(LogicalAddress::new("o://").root().value(), "o://");
    }

    #[test]
    fn test_segments() {
        assert_eq!(
            LogicalAddress::new("o://a/b/c").path_segments(),
            vec!["a", "b", "c"]
        );
        assert!(LogicalAddress::new("o://").path_segments().is_empty());
    }

    #[test]
    fn test_with_appended_path_single_slash() {
        let base = LogicalAddress::with_hints("o://a", vec!["relay:1".into()]);
        let child = base.with_appended_path("b");
        assert_eq!(child.value(), "o://a/b");
        assert_eq!(child.transports().len(), 1);

        assert_eq!(
            LogicalAddress::new("o://a/").with_appended_path("/b").value(),
            "o://a/b"
        );
        assert_eq!(base.value(), "o://a");
    }

    #[test]
    fn test_child_of() {
        let parent = LogicalAddress::new("o://a/b");
        let child = LogicalAddress::new("o://c/d");
        assert_eq!(LogicalAddress::child_of(&parent, &child).value(), "o://a/b/c/d");

        let bare = LogicalAddress::new("o://");
        assert_eq!(LogicalAddress::child_of(&bare, &child).value(), "o:///c/d");
    }

    #[test]
    fn test_prefix_is_textual() {
        let addr = LogicalAddress::new("o://leadership/x");
        assert!(addr.is_under_prefix(REGISTRY_ROOT));
        assert!(!addr.is_registry_address());
        assert!(LogicalAddress::new("o://leader/register").is_registry_address());
    }

    #[test]
    fn test_capability_helpers() {
        let tool = LogicalAddress::new("o://node/tools/search/run");
        assert!(tool.is_capability_address());
        assert_eq!(tool.capability_name(), Some("search"));
        assert_eq!(tool.final_method_segment(), Some("run"));

        let plain = LogicalAddress::new("o://node/other/search");
        assert!(!plain.is_capability_address());
        assert_eq!(plain.capability_name(), None);
        assert_eq!(LogicalAddress::new("o://node/tool").capability_name(), None);
    }

    #[test]
    fn test_protocol_form() {
        let addr = LogicalAddress::new("o://a/b");
        assert_eq!(addr.protocol(), "/o/a/b");
        assert_eq!(LogicalAddress::from_protocol("/o/a/b"), addr);
    }

    #[test]
    fn test_equality_ignores_hints() {
        let a = LogicalAddress::with_hints("o://a", vec!["x".into()]);
        let b = LogicalAddress::new("o://a");
        assert_eq!(a, b);
        assert_ne!(a, LogicalAddress::new("o://a/"));
    }

    #[test]
    fn test_hint_views_keep_order() {
        let addr = LogicalAddress::with_hints(
            "o://a",
            vec![
                "opaque-1".into(),
                "/ip4/1.1.1.1/tcp/1".into(),
                "opaque-1".into(),
            ],
        );
        assert_eq!(addr.opaque_transports(), vec!["opaque-1", "opaque-1"]);
        assert_eq!(addr.structured_transports().len(), 1);
        assert_eq!(
            addr.all_transports(),
            vec!["opaque-1", "/ip4/1.1.1.1/tcp/1", "opaque-1"]
        );
    }

    #[test]
    fn test_parse() {
        assert!(LogicalAddress::parse("o://ok").is_ok());
        assert_eq!(
            LogicalAddress::parse("http://nope"),
            Err(Error::InvalidAddress("http://nope".to_string()))
        );
        assert!("o://x/y".parse::<LogicalAddress>().is_ok());
    }
}
