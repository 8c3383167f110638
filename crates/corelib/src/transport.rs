//! Transport hints attached to logical addresses.
//!
//! A hint tells the dialer how to physically reach an address. It is either a
//! structured multi-protocol [`Endpoint`] (`/ip4/10.0.0.1/tcp/4001/p2p/<peer>`)
//! or an opaque string understood only by a custom transport.

use crate::error::{Error, Result};
use multiaddr::{Multiaddr, Protocol};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Structured multi-protocol endpoint (`/ip4/1.2.3.4/tcp/4001/p2p/<peer>`).
///
/// Backed by a [`Multiaddr`], so only well-formed endpoints of known
/// protocols parse.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint(Multiaddr);

impl Endpoint {
    pub fn parse(input: &str) -> Result<Self> {
        let addr = Multiaddr::from_str(input)
            .map_err(|e| Error::InvalidEndpoint(format!("{}: {}", input, e)))?;
        if addr.is_empty() {
            return Err(Error::InvalidEndpoint(input.to_string()));
        }
        Ok(Self(addr))
    }

    pub fn as_multiaddr(&self) -> &Multiaddr {
        &self.0
    }

    /// Protocol components, in order.
    pub fn protocols(&self) -> impl Iterator<Item = Protocol<'_>> {
        self.0.iter()
    }

    /// Peer identity carried by the `p2p` component.
    pub fn peer_id(&self) -> Result<String> {
        self.0
            .iter()
            .find_map(|protocol| match protocol {
                Protocol::P2p(peer) => Some(peer.to_string()),
                _ => None,
            })
            .ok_or_else(|| Error::MissingPeerId(self.to_string()))
    }
}

impl From<Multiaddr> for Endpoint {
    fn from(addr: Multiaddr) -> Self {
        Self(addr)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Endpoint {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.to_string()
    }
}

/// How to physically reach an address.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransportHint {
    /// Structured endpoint the default transport can dial.
    Endpoint(Endpoint),
    /// Opaque string for a custom transport.
    Opaque(String),
}

impl TransportHint {
    /// Classify a textual hint: a well-formed multiaddr is structured,
    /// everything else stays opaque.
    pub fn parse(input: &str) -> Self {
        match Endpoint::parse(input) {
            Ok(endpoint) => TransportHint::Endpoint(endpoint),
            Err(_) => TransportHint::Opaque(input.to_string()),
        }
    }

    pub fn as_endpoint(&self) -> Option<&Endpoint> {
        match self {
            TransportHint::Endpoint(e) => Some(e),
            TransportHint::Opaque(_) => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&str> {
        match self {
            TransportHint::Endpoint(_) => None,
            TransportHint::Opaque(s) => Some(s),
        }
    }

    pub fn is_endpoint(&self) -> bool {
        matches!(self, TransportHint::Endpoint(_))
    }
}

impl fmt::Display for TransportHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportHint::Endpoint(e) => e.fmt(f),
            TransportHint::Opaque(s) => f.write_str(s),
        }
    }
}

impl From<Endpoint> for TransportHint {
    fn from(endpoint: Endpoint) -> Self {
        TransportHint::Endpoint(endpoint)
    }
}

impl From<String> for TransportHint {
    fn from(value: String) -> Self {
        TransportHint::parse(&value)
    }
}

impl From<&str> for TransportHint {
    fn from(value: &str) -> Self {
        TransportHint::parse(value)
    }
}

impl From<TransportHint> for String {
    fn from(hint: TransportHint) -> Self {
        hint.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEER: &str = "QmNnooDu7bfjPFoTZYxMNLWUQJyrVwtbZg5gBMjTezGAJN";

    #[test]
    fn test_endpoint_round_trip() {
        let text = format!("/ip4/127.0.0.1/tcp/4001/p2p/{}", PEER);
        let endpoint = Endpoint::parse(&text).unwrap();
        assert_eq!(endpoint.protocols().count(), 3);
        assert_eq!(endpoint.to_string(), text);
        assert_eq!(endpoint.peer_id().unwrap(), PEER);
    }

    #[test]
    fn test_endpoint_without_peer() {
        let endpoint = Endpoint::parse("/ip4/10.0.0.1/udp/9000/quic-v1").unwrap();
        assert_eq!(endpoint.protocols().count(), 3);
        assert!(matches!(endpoint.peer_id(), Err(Error::MissingPeerId(_))));
    }

    #[test]
    fn test_endpoint_rejects_garbage() {
        for bad in [
            "",
            "/",
            "ip4/1.2.3.4",
            "/ip4",
            "/ip4//tcp/1",
            "/ip4/not-an-ip/tcp/port",
            "/ip4/999.1.1.1/tcp/99999",
            "/ip4/1.2.3.4/tcp/99999",
            "/banana/split",
            "/ip4/1.2.3.4/tcp/1/p2p/not-a-peer",
        ] {
            assert!(Endpoint::parse(bad).is_err(), "{bad} parsed");
        }
    }

    #[test]
    fn test_hint_classification() {
        assert!(TransportHint::parse("/ip4/1.2.3.4/tcp/1").is_endpoint());
        assert!(TransportHint::parse("/dns4/leader.example/tcp/443/wss").is_endpoint());

        let opaque = TransportHint::parse("custom-transport:abc");
        assert_eq!(opaque.as_opaque(), Some("custom-transport:abc"));
        assert!(opaque.as_endpoint().is_none());

        // Slash-shaped strings of unknown protocols stay opaque
        for text in ["/relay/ticket-abc", "/banana/split", "/ip4/banana/tcp/notaport"] {
            let hint = TransportHint::parse(text);
            assert_eq!(hint.as_opaque(), Some(text));
            assert_eq!(hint.to_string(), text);
        }
    }

    #[test]
    fn test_hint_serializes_as_string() {
        let hints = vec![
            TransportHint::parse("/ip4/1.2.3.4/tcp/1"),
            TransportHint::parse("relay:xyz"),
        ];
        let json = serde_json::to_string(&hints).unwrap();
        assert_eq!(json, r#"["/ip4/1.2.3.4/tcp/1","relay:xyz"]"#);
        let back: Vec<TransportHint> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hints);
    }

    #[test]
    fn test_endpoint_deserialize_rejects_garbage() {
        assert!(serde_json::from_str::<Endpoint>(r#""/ip4/1.2.3.4/tcp/1""#).is_ok());
        assert!(serde_json::from_str::<Endpoint>(r#""/ip4/banana""#).is_err());
    }
}
