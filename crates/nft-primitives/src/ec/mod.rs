//! secp256k1 elliptic-curve keys and ECDSA signatures.
//!
//! Thin Bitcoin-flavored wrappers over `k256`: WIF encoding for private
//! keys, compressed SEC1 public keys, and DER signatures with low-S
//! normalization.

mod private_key;
mod public_key;
mod signature;

pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::Signature;
