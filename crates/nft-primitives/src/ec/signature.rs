//! ECDSA signature with DER encoding and low-S normalization.

use k256::ecdsa;

use crate::ec::private_key::PrivateKey;
use crate::PrimitivesError;

/// An ECDSA signature over secp256k1.
///
/// Stores the raw R and S components; serialization is DER with the S
/// value normalized to the lower half of the curve order (BIP-62).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
}

impl Signature {
    /// Build a signature from raw big-endian R and S components.
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Signature { r, s }
    }

    /// Sign a message hash with deterministic RFC 6979 nonces.
    ///
    /// Hashes shorter than 32 bytes are left-padded with zeros; longer
    /// inputs are truncated to 32 bytes.
    pub fn sign(hash: &[u8], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let padded = Self::normalize_hash(hash);
        let (mut sig, _recovery_id) = priv_key
            .signing_key()
            .sign_prehash_recoverable(&padded)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;

        if let Some(normalized) = sig.normalize_s() {
            sig = normalized;
        }

        let (r_bytes, s_bytes) = sig.split_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&r_bytes);
        s.copy_from_slice(&s_bytes);
        Ok(Signature { r, s })
    }

    /// Parse a DER-encoded signature: `0x30 len 0x02 rlen R 0x02 slen S`.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() < 8 || bytes[0] != 0x30 {
            return Err(PrimitivesError::InvalidSignature(
                "malformed DER header".to_string(),
            ));
        }
        let body_len = bytes[1] as usize;
        if body_len + 2 > bytes.len() {
            return Err(PrimitivesError::InvalidSignature(
                "DER length exceeds input".to_string(),
            ));
        }
        let data = &bytes[..body_len + 2];

        let mut idx = 2;
        let r = Self::read_der_int(data, &mut idx)?;
        let s = Self::read_der_int(data, &mut idx)?;
        Ok(Signature { r, s })
    }

    fn read_der_int(data: &[u8], idx: &mut usize) -> Result<[u8; 32], PrimitivesError> {
        if *idx + 2 > data.len() || data[*idx] != 0x02 {
            return Err(PrimitivesError::InvalidSignature(
                "missing DER integer marker".to_string(),
            ));
        }
        let len = data[*idx + 1] as usize;
        *idx += 2;
        if len == 0 || *idx + len > data.len() {
            return Err(PrimitivesError::InvalidSignature(
                "bad DER integer length".to_string(),
            ));
        }
        let raw = &data[*idx..*idx + len];
        *idx += len;

        // Strip the sign byte, then left-pad to 32 bytes.
        let trimmed = if raw.len() > 1 && raw[0] == 0x00 {
            &raw[1..]
        } else {
            raw
        };
        if trimmed.len() > 32 {
            return Err(PrimitivesError::InvalidSignature(
                "DER integer wider than 32 bytes".to_string(),
            ));
        }
        let mut out = [0u8; 32];
        out[32 - trimmed.len()..].copy_from_slice(trimmed);
        Ok(out)
    }

    /// Serialize in DER format.
    pub fn to_der(&self) -> Vec<u8> {
        let rb = canonicalize_int(&self.r);
        let sb = canonicalize_int(&self.s);

        let mut out = Vec::with_capacity(6 + rb.len() + sb.len());
        out.push(0x30);
        out.push((4 + rb.len() + sb.len()) as u8);
        out.push(0x02);
        out.push(rb.len() as u8);
        out.extend_from_slice(&rb);
        out.push(0x02);
        out.push(sb.len() as u8);
        out.extend_from_slice(&sb);
        out
    }

    /// Parse a hex-encoded DER signature.
    pub fn from_der_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes =
            hex::decode(hex_str).map_err(|e| PrimitivesError::InvalidHex(e.to_string()))?;
        Self::from_der(&bytes)
    }

    pub(crate) fn to_k256(&self) -> Result<ecdsa::Signature, PrimitivesError> {
        ecdsa::Signature::from_scalars(
            k256::FieldBytes::from(self.r),
            k256::FieldBytes::from(self.s),
        )
        .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))
    }

    pub(crate) fn normalize_hash(hash: &[u8]) -> [u8; 32] {
        let mut padded = [0u8; 32];
        if hash.len() >= 32 {
            padded.copy_from_slice(&hash[..32]);
        } else {
            padded[32 - hash.len()..].copy_from_slice(hash);
        }
        padded
    }
}

/// Minimal big-endian DER integer encoding: strip leading zeros, then
/// prepend one zero byte if the high bit is set.
fn canonicalize_int(bytes: &[u8; 32]) -> Vec<u8> {
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(31);
    let trimmed = &bytes[first_nonzero..];
    if trimmed[0] & 0x80 != 0 {
        let mut out = Vec::with_capacity(trimmed.len() + 1);
        out.push(0x00);
        out.extend_from_slice(trimmed);
        out
    } else {
        trimmed.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ec::PrivateKey;
    use crate::hash::sha256;

    #[test]
    fn sign_and_verify() {
        let key = PrivateKey::new();
        let hash = sha256(b"message");
        let sig = key.sign(&hash).unwrap();
        assert!(key.pub_key().verify(&hash, &sig));
    }

    #[test]
    fn verify_rejects_wrong_hash() {
        let key = PrivateKey::new();
        let sig = key.sign(&sha256(b"message")).unwrap();
        assert!(!key.pub_key().verify(&sha256(b"other"), &sig));
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let key = PrivateKey::new();
        let hash = sha256(b"message");
        let sig = key.sign(&hash).unwrap();
        assert!(!PrivateKey::new().pub_key().verify(&hash, &sig));
    }

    #[test]
    fn der_roundtrip() {
        let key = PrivateKey::new();
        let hash = sha256(b"der roundtrip");
        let sig = key.sign(&hash).unwrap();
        let restored = Signature::from_der(&sig.to_der()).unwrap();
        assert_eq!(sig, restored);
        assert!(key.pub_key().verify(&hash, &restored));
    }

    #[test]
    fn from_der_rejects_garbage() {
        assert!(Signature::from_der(&[]).is_err());
        assert!(Signature::from_der(&[0x30, 0x06, 0x01, 0x01, 0xaa]).is_err());
    }
}
