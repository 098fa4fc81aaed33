#![deny(missing_docs)]
//! Cryptographic and wire-format primitives for the Sensible NFT SDK.
//!
//! Provides the hash functions, secp256k1 keys and signatures, Rabin
//! signatures, transaction hashes, and byte-level wire utilities that the
//! protocol crates build on. The ECDSA and Rabin primitive sets are
//! independent: chain transactions are authorized with secp256k1 ECDSA,
//! oracle attestations with Rabin, and neither is ever substituted for
//! the other.

pub mod chainhash;
pub mod ec;
pub mod error;
pub mod hash;
pub mod rabin;
pub mod util;

pub use error::PrimitivesError;
