#![deny(missing_docs)]
//! Transaction types for the Sensible NFT SDK.
//!
//! Bitcoin-wire transaction encoding and decoding, BIP-143 (FORKID)
//! signature hashes, and the unlocking-script template abstraction with
//! a P2PKH implementation.

pub mod error;
pub mod input;
pub mod output;
pub mod sighash;
pub mod template;
pub mod transaction;

pub use error::TransactionError;
pub use input::TransactionInput;
pub use output::TransactionOutput;
pub use transaction::Transaction;
