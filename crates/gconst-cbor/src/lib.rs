//! Canonical CBOR helpers and stable SHA-256 content hashes used across gconst.

use serde::{Serialize, de::DeserializeOwned};
use serde_cbor::{ser::Write as CborWrite, value::Value as CborValue};
use sha2::{Digest, Sha256};
use std::fmt;

/// Prefix for rendered hashes (e.g. `sha256:deadbeef`).
pub const HASH_PREFIX: &str = "sha256:";

/// Serialize a value into canonical CBOR bytes using RFC 8949 deterministic rules.
pub fn to_canonical_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_cbor::Error> {
    let mut buf = Vec::with_capacity(128);
    write_canonical_cbor(value, &mut buf)?;
    Ok(buf)
}

/// Serialize a value directly into an arbitrary CBOR writer using canonical settings.
///
/// Going through `serde_cbor::Value` sorts map keys, so two equal values always
/// produce identical bytes regardless of insertion order.
pub fn write_canonical_cbor<T: Serialize, W>(value: &T, writer: W) -> Result<(), serde_cbor::Error>
where
    W: CborWrite,
{
    let canonical_value: CborValue = serde_cbor::value::to_value(value)?;
    let mut serializer = serde_cbor::ser::Serializer::new(writer);
    serializer.self_describe()?;
    canonical_value.serialize(&mut serializer)
}

/// Decode CBOR bytes (self-described or not) into `T`.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_cbor::Error> {
    serde_cbor::from_slice(bytes)
}

/// Wrapper around a 32-byte SHA-256 digest used for content addressing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; 32]);

impl Hash {
    /// Compute the hash of a value's canonical CBOR encoding.
    pub fn of_cbor<T: Serialize>(value: &T) -> Result<Self, serde_cbor::Error> {
        Ok(Self::of_bytes(&to_canonical_cbor(value)?))
    }

    /// Compute the hash of the provided byte slice.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hasher.finalize();
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&digest);
        Hash(arr)
    }

    /// Render the digest as a `sha256:...` hex string.
    pub fn to_hex(&self) -> String {
        format!("{HASH_PREFIX}{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hash").field(&self.to_hex()).finish()
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
