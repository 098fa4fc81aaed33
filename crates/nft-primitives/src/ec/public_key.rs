//! secp256k1 public key.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;

use crate::ec::signature::Signature;
use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of a compressed SEC1 public key.
const COMPRESSED_LEN: usize = 33;

/// A secp256k1 public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Parse a SEC1-encoded public key (compressed or uncompressed).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let inner = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
        Ok(PublicKey { inner })
    }

    /// Parse a hex-encoded SEC1 public key.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes =
            hex::decode(hex_str).map_err(|e| PrimitivesError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// The 33-byte compressed SEC1 encoding.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Hex of the compressed encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Hash160 of the compressed encoding (the address public key hash).
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }

    /// Verify an ECDSA signature over a 32-byte message hash.
    pub fn verify(&self, hash: &[u8], sig: &Signature) -> bool {
        let Ok(k256_sig) = sig.to_k256() else {
            return false;
        };
        let padded = Signature::normalize_hash(hash);
        self.inner.verify_prehash(&padded, &k256_sig).is_ok()
    }

    pub(crate) fn from_verifying_key(inner: VerifyingKey) -> Self {
        PublicKey { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ec::PrivateKey;

    #[test]
    fn compressed_roundtrip() {
        let key = PrivateKey::new().pub_key();
        let restored = PublicKey::from_bytes(&key.to_compressed()).unwrap();
        assert_eq!(key, restored);
    }

    #[test]
    fn hex_roundtrip() {
        let key = PrivateKey::new().pub_key();
        let restored = PublicKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(key.to_compressed(), restored.to_compressed());
    }

    #[test]
    fn not_on_curve_rejected() {
        assert!(PublicKey::from_bytes(&[0x02; 33]).is_err());
        assert!(PublicKey::from_bytes(&[]).is_err());
    }
}
