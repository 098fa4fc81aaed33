#![deny(missing_docs)]
//! Sensible NFT SDK - complete SDK.
//!
//! Re-exports all workspace components for convenient single-crate usage.

pub use nft_chain as chain;
pub use nft_core as core;
pub use nft_oracle as oracle;
pub use nft_primitives as primitives;
pub use nft_script as script;
pub use nft_transaction as transaction;
