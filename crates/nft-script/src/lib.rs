#![deny(missing_docs)]
//! Bitcoin script and address types for the Sensible NFT SDK.
//!
//! Provides the [`Script`] byte-vector newtype with push-data encoding and
//! classification helpers, the opcode constants the protocol templates
//! use, and Base58Check [`Address`] handling for mainnet and testnet.

pub mod address;
pub mod error;
pub mod opcodes;
pub mod script;

pub use address::{Address, Network};
pub use error::ScriptError;
pub use script::Script;
