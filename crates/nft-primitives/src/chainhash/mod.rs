//! 32-byte chain hash type for transaction IDs.

use std::fmt;

use crate::hash::sha256d;
use crate::PrimitivesError;

/// A 32-byte hash in internal (little-endian) byte order.
///
/// Transaction IDs are stored internally as the raw double-SHA256 of the
/// serialized transaction. The conventional display form reverses the
/// bytes, so `from_hex`/`to_hex` operate on the display order while
/// `as_bytes` exposes the internal order used on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash([u8; 32]);

impl Hash {
    /// Wrap raw internal-order bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != 32 {
            return Err(PrimitivesError::InvalidHash(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut inner = [0u8; 32];
        inner.copy_from_slice(bytes);
        Ok(Hash(inner))
    }

    /// Parse a display-order (big-endian) hex txid string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let mut bytes = hex::decode(hex_str)
            .map_err(|e| PrimitivesError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(PrimitivesError::InvalidHash(format!(
                "expected 64 hex chars, got {}",
                hex_str.len()
            )));
        }
        bytes.reverse();
        Self::from_bytes(&bytes)
    }

    /// Compute the hash of the given data (double SHA-256, internal order).
    pub fn of(data: &[u8]) -> Self {
        Hash(sha256d(data))
    }

    /// The internal-order bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render in conventional display order (byte-reversed hex).
    pub fn to_hex(&self) -> String {
        let mut rev = self.0;
        rev.reverse();
        hex::encode(rev)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}
