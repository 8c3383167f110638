//! Content identifiers for network advertisement.
//!
//! CIDv1 over the compact JSON `{"address":"<value>"}`: dag-json codec,
//! sha2-256 multihash, base32 (lower case, unpadded) multibase.

use crate::error::Result;
use data_encoding::BASE32_NOPAD;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use unsigned_varint::encode as varint;

const CID_VERSION: u64 = 1;
const DAG_JSON_CODEC: u64 = 0x0129;
const SHA2_256_CODE: u64 = 0x12;
const BASE32_MULTIBASE: char = 'b';

#[derive(Serialize)]
struct CanonicalAddress<'a> {
    address: &'a str,
}

/// Binary CID plus its string rendering.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContentId {
    bytes: Vec<u8>,
}

impl ContentId {
    /// Identifier for an address value.
    pub fn for_address(value: &str) -> Result<Self> {
        let canonical = serde_json::to_vec(&CanonicalAddress { address: value })?;
        Ok(Self::from_dag_json(&canonical))
    }

    /// Identifier for an already canonical dag-json payload.
    pub fn from_dag_json(payload: &[u8]) -> Self {
        let digest = Sha256::digest(payload);

        let mut bytes = Vec::with_capacity(digest.len() + 8);
        let mut buf = varint::u64_buffer();
        for field in [CID_VERSION, DAG_JSON_CODEC, SHA2_256_CODE, digest.len() as u64] {
            bytes.extend_from_slice(varint::u64(field, &mut buf));
        }
        bytes.extend_from_slice(&digest);

        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = BASE32_NOPAD.encode(&self.bytes).to_ascii_lowercase();
        write!(f, "{}{}", BASE32_MULTIBASE, encoded)
    }
}
