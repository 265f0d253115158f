//! Content fingerprints for bucket-sync.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ManifestError;

/// BLAKE3 content fingerprint of a chunk's bytes.
///
/// 32 bytes, displayed and serialized as 64 lowercase hex characters so
/// manifests stay human-diffable.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkHash([u8; 32]);

impl ChunkHash {
    /// Compute the fingerprint of a byte buffer.
    pub fn from_data(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Create a ChunkHash from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() == 32 {
            let mut arr = [0u8; 32];
            arr.copy_from_slice(bytes);
            Some(Self(arr))
        } else {
            None
        }
    }

    /// Parse a ChunkHash from its hex form.
    pub fn from_hex(s: &str) -> Result<Self, ManifestError> {
        let bytes =
            hex::decode(s).map_err(|e| ManifestError::InvalidHash(format!("{s}: {e}")))?;
        Self::from_bytes(&bytes).ok_or_else(|| {
            ManifestError::InvalidHash(format!("expected 32 bytes, got {}", bytes.len()))
        })
    }

    /// Get the raw bytes of this ChunkHash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex form of this ChunkHash (64 lowercase characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<blake3::Hash> for ChunkHash {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

impl fmt::Display for ChunkHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ChunkHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkHash({})", &self.to_hex()[..8])
    }
}

impl Serialize for ChunkHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ChunkHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
