//! Rabin signatures for oracle attestations.
//!
//! The oracle quorum signs attestation payloads with Rabin signatures
//! rather than ECDSA: a signature `s` over message `m` with padding `pad`
//! satisfies `s^2 ≡ H(m || 0^pad) (mod n)` where `n = p * q` and both
//! primes are congruent to 3 mod 4. The locking script can check this
//! with a single big-number multiplication, which is why the protocol
//! uses the scheme on-chain.
//!
//! `H` expands a SHA-256 digest chain to [`HASH_BYTES`] bytes and
//! interprets the result as a little-endian integer reduced mod `n`.
//! Signing retries with one extra zero-padding byte until the digest is a
//! quadratic residue modulo both primes (one in four digests is, per
//! prime, so the search ends quickly).
//!
//! Big-integer values cross the wire in little-endian byte order, padded
//! to the modulus width. This encoding is specific to the Rabin primitive
//! set and is never mixed with the DER encoding of chain signatures.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;

use crate::hash::sha256;
use crate::PrimitivesError;

/// Width of the expanded digest fed into the modular reduction.
pub const HASH_BYTES: usize = 96;

/// Upper bound on the zero-padding search during signing.
const MAX_PADDING: u64 = 128;

/// A Rabin signing key: the two secret primes and their product.
#[derive(Clone, Debug)]
pub struct RabinPrivateKey {
    p: BigUint,
    q: BigUint,
    n: BigUint,
}

/// A Rabin verification key: the public modulus `n = p * q`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RabinPublicKey {
    n: BigUint,
}

/// A Rabin signature: the square root `s` and the padding byte count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RabinSignature {
    s: BigUint,
    padding: u64,
}

impl RabinPrivateKey {
    /// Build a signing key from two primes.
    ///
    /// # Errors
    /// Returns [`PrimitivesError::InvalidRabinKey`] unless both primes are
    /// distinct, greater than 3, and congruent to 3 mod 4. Primality
    /// itself is the caller's responsibility; oracle deployments generate
    /// keys offline.
    pub fn from_primes(p: BigUint, q: BigUint) -> Result<Self, PrimitivesError> {
        let three = BigUint::from(3u8);
        let four = BigUint::from(4u8);
        if p <= three || q <= three {
            return Err(PrimitivesError::InvalidRabinKey(
                "primes must be greater than 3".to_string(),
            ));
        }
        if p == q {
            return Err(PrimitivesError::InvalidRabinKey(
                "primes must be distinct".to_string(),
            ));
        }
        if (&p % &four) != three || (&q % &four) != three {
            return Err(PrimitivesError::InvalidRabinKey(
                "primes must be congruent to 3 mod 4".to_string(),
            ));
        }
        let n = &p * &q;
        Ok(RabinPrivateKey { p, q, n })
    }

    /// Build a signing key from decimal prime strings.
    pub fn from_decimal(p: &str, q: &str) -> Result<Self, PrimitivesError> {
        let parse = |s: &str| {
            s.parse::<BigUint>().map_err(|e| {
                PrimitivesError::InvalidRabinKey(format!("invalid decimal prime: {e}"))
            })
        };
        Self::from_primes(parse(p)?, parse(q)?)
    }

    /// The corresponding public key.
    pub fn public_key(&self) -> RabinPublicKey {
        RabinPublicKey { n: self.n.clone() }
    }

    /// Sign a message.
    ///
    /// Appends zero bytes until the expanded digest is a quadratic residue
    /// modulo both primes, then takes the CRT-combined square root.
    ///
    /// # Errors
    /// Returns [`PrimitivesError::RabinSigningFailed`] if no residue is
    /// found within the padding bound (cryptographically negligible for
    /// valid keys).
    pub fn sign(&self, message: &[u8]) -> Result<RabinSignature, PrimitivesError> {
        let mut padded = message.to_vec();
        for padding in 0..MAX_PADDING {
            let h = hash_to_int(&padded, &self.n);
            let hp = &h % &self.p;
            let hq = &h % &self.q;

            if is_quadratic_residue(&hp, &self.p) && is_quadratic_residue(&hq, &self.q) {
                let s = self.crt_sqrt(&hp, &hq);
                debug_assert_eq!(s.modpow(&BigUint::from(2u8), &self.n), h);
                return Ok(RabinSignature { s, padding });
            }
            padded.push(0x00);
        }
        Err(PrimitivesError::RabinSigningFailed(format!(
            "no quadratic residue within {MAX_PADDING} padding bytes"
        )))
    }

    /// Square roots mod p and q combined via the Chinese remainder theorem.
    fn crt_sqrt(&self, hp: &BigUint, hq: &BigUint) -> BigUint {
        let one = BigUint::from(1u8);
        let four = BigUint::from(4u8);
        let exp_p = (&self.p + &one) / &four;
        let exp_q = (&self.q + &one) / &four;
        let xp = hp.modpow(&exp_p, &self.p);
        let xq = hq.modpow(&exp_q, &self.q);

        let p_int = BigInt::from(self.p.clone());
        let q_int = BigInt::from(self.q.clone());
        let n_int = BigInt::from(self.n.clone());
        // ext.x * p + ext.y * q == 1, so ext.y is q^-1 mod p and ext.x is p^-1 mod q.
        let ext = p_int.extended_gcd(&q_int);
        let inv_q_mod_p = ext.y.mod_floor(&p_int);
        let inv_p_mod_q = ext.x.mod_floor(&q_int);

        let term_p = BigInt::from(xp) * &q_int * inv_q_mod_p;
        let term_q = BigInt::from(xq) * &p_int * inv_p_mod_q;
        let s = (term_p + term_q).mod_floor(&n_int);
        s.to_biguint().expect("mod_floor result is non-negative")
    }
}

impl RabinPublicKey {
    /// Wrap a modulus.
    pub fn new(n: BigUint) -> Self {
        RabinPublicKey { n }
    }

    /// Parse a little-endian modulus encoding.
    pub fn from_bytes_le(bytes: &[u8]) -> Self {
        RabinPublicKey {
            n: BigUint::from_bytes_le(bytes),
        }
    }

    /// Little-endian modulus bytes (no padding).
    pub fn to_bytes_le(&self) -> Vec<u8> {
        self.n.to_bytes_le()
    }

    /// Width of the modulus in bytes; signatures encode to this width.
    pub fn byte_len(&self) -> usize {
        (self.n.bits() as usize).div_ceil(8)
    }

    /// Verify a signature: `s^2 ≡ H(message || 0^padding) (mod n)`.
    pub fn verify(&self, message: &[u8], sig: &RabinSignature) -> bool {
        if sig.s >= self.n {
            return false;
        }
        let mut padded = Vec::with_capacity(message.len() + sig.padding as usize);
        padded.extend_from_slice(message);
        padded.resize(message.len() + sig.padding as usize, 0x00);

        let h = hash_to_int(&padded, &self.n);
        sig.s.modpow(&BigUint::from(2u8), &self.n) == h
    }
}

impl RabinSignature {
    /// Rebuild a signature from its wire parts.
    pub fn from_parts(s_le: &[u8], padding: u64) -> Self {
        RabinSignature {
            s: BigUint::from_bytes_le(s_le),
            padding,
        }
    }

    /// Little-endian signature bytes, zero-padded to `width`.
    pub fn to_bytes_le(&self, width: usize) -> Vec<u8> {
        let mut bytes = self.s.to_bytes_le();
        bytes.resize(width.max(bytes.len()), 0x00);
        bytes
    }

    /// The zero-padding byte count appended to the message before hashing.
    pub fn padding(&self) -> u64 {
        self.padding
    }
}

/// Expand a message to [`HASH_BYTES`] bytes by chaining SHA-256, then
/// reduce the little-endian integer value mod `n`.
fn hash_to_int(message: &[u8], n: &BigUint) -> BigUint {
    let mut expanded = Vec::with_capacity(HASH_BYTES);
    let mut block = sha256(message);
    while expanded.len() < HASH_BYTES {
        expanded.extend_from_slice(&block);
        block = sha256(&block);
    }
    expanded.truncate(HASH_BYTES);
    BigUint::from_bytes_le(&expanded) % n
}

/// Euler's criterion for primes congruent to 3 mod 4 (zero counts as a
/// residue).
fn is_quadratic_residue(value: &BigUint, prime: &BigUint) -> bool {
    let one = BigUint::from(1u8);
    if value == &BigUint::from(0u8) {
        return true;
    }
    let exp = (prime - &one) / BigUint::from(2u8);
    value.modpow(&exp, prime) == one
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Small primes congruent to 3 mod 4, large enough that the expanded
    /// digest wraps the modulus.
    fn test_key() -> RabinPrivateKey {
        RabinPrivateKey::from_decimal(
            "9097722629658742293420164578669589841085955461180077367949962570265327809330787612920943525832253321016059488904439217610557062309293622829749956284685663",
            "9126947698968185300906443468174075795240339607655376474995985065589996990930531271347872860645128582337718364760483431238305785744054838671606080407999619",
        )
        .unwrap()
    }

    #[test]
    fn sign_verify_roundtrip() {
        let key = test_key();
        let sig = key.sign(b"attestation payload").unwrap();
        assert!(key.public_key().verify(b"attestation payload", &sig));
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let key = test_key();
        let sig = key.sign(b"attestation payload").unwrap();
        assert!(!key.public_key().verify(b"attestation payloae", &sig));
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let key = test_key();
        let other = RabinPrivateKey::from_decimal(
            "10013370081971838732064932824917489126779544859551628210452373322882599766074628419328363087228144282926181507163047411352342902093561348518988770738794651",
            "13158645327263022664430689347689524371558011089472609974341971392560184982122314889439464550107857266816504095569123077137128140607777943854590772860939827",
        )
        .unwrap();
        let sig = key.sign(b"payload").unwrap();
        assert!(!other.public_key().verify(b"payload", &sig));
    }

    #[test]
    fn verify_rejects_wrong_padding() {
        let key = test_key();
        let sig = key.sign(b"payload").unwrap();
        let tampered = RabinSignature {
            s: sig.s.clone(),
            padding: sig.padding + 1,
        };
        assert!(!key.public_key().verify(b"payload", &tampered));
    }

    #[test]
    fn wire_roundtrip_preserves_signature() {
        let key = test_key();
        let public = key.public_key();
        let sig = key.sign(b"wire").unwrap();
        let width = public.byte_len();
        let restored = RabinSignature::from_parts(&sig.to_bytes_le(width), sig.padding());
        assert_eq!(sig, restored);
        assert!(public.verify(b"wire", &restored));
    }

    #[test]
    fn wrong_residue_class_rejected() {
        // 13 ≡ 1 (mod 4)
        let p = BigUint::from(13u32);
        let q = BigUint::from(23u32);
        assert!(RabinPrivateKey::from_primes(p, q).is_err());
    }

    #[test]
    fn equal_primes_rejected() {
        let p = BigUint::from(23u32);
        assert!(RabinPrivateKey::from_primes(p.clone(), p).is_err());
    }

    #[test]
    fn public_key_bytes_roundtrip() {
        let public = test_key().public_key();
        let restored = RabinPublicKey::from_bytes_le(&public.to_bytes_le());
        assert_eq!(public, restored);
    }
}
