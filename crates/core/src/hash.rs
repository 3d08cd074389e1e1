//! Content hashing using BLAKE3 over canonical CBOR.

use crate::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A 32-byte BLAKE3 hash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The zero hash, used as the predecessor of the first event.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Hash arbitrary bytes.
    pub fn of(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Hash a serializable value using CBOR.
    pub fn of_value<T: Serialize>(value: &T) -> Result<Self, Error> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)?;
        Ok(Self::of(&buf))
    }

    /// Extend a hash chain: `BLAKE3(self || CBOR(value))`.
    pub fn chain<T: Serialize>(&self, value: &T) -> Result<Self, Error> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.0);
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)?;
        hasher.update(&buf);
        Ok(Self(*hasher.finalize().as_bytes()))
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).ok()?;
        Some(Self(bytes))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Default for Hash {
    fn default() -> Self {
        Self::ZERO
    }
}

// Snapshots carry digests as hex so the JSON ledger file stays readable.
impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).ok_or_else(|| serde::de::Error::custom("invalid hash hex"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_deterministic() {
        let data = b"hello world";
        assert_eq!(Hash::of(data), Hash::of(data));
    }

    #[test]
    fn hash_different_inputs() {
        assert_ne!(Hash::of(b"hello"), Hash::of(b"world"));
    }

    #[test]
    fn hex_roundtrip() {
        let h = Hash::of(b"test");
        assert_eq!(Hash::from_hex(&h.to_hex()), Some(h));
        assert_eq!(Hash::from_hex("abcd"), None);
    }

    #[test]
    fn chain_depends_on_predecessor() {
        let a = Hash::ZERO.chain(&(0u64, "x")).unwrap();
        let b = Hash::of(b"other").chain(&(0u64, "x")).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, Hash::ZERO.chain(&(0u64, "x")).unwrap());
    }
}
