#![deny(missing_docs)]
//! Sensible NFT protocol engine.
//!
//! Implements the BCP01-style non-fungible-token lifecycle on top of the
//! workspace's chain and oracle crates. All token state lives in on-chain
//! outputs: a series is created by a genesis transaction that fixes its
//! total supply, each issue consumes and re-emits the series' mint slot
//! while minting one ordinal, and transfers reassign an ordinal's owner
//! in place. The engine re-derives all state from chain queries on every
//! call; nothing is cached between operations.
//!
//! Two construction flows share the same transaction shapes: the
//! automatic flow signs with locally held keys and broadcasts, while the
//! unsigned flow returns the transaction plus an ordered signature-hash
//! descriptor list and merges externally produced signatures in
//! [`engine::NonFungibleToken::sign`].

pub mod engine;
pub mod error;
pub mod factory;
pub mod fee;
pub mod mock;
pub mod script;
pub mod selector;
pub mod types;

pub use engine::NonFungibleToken;
pub use error::NftError;
pub use mock::MockChainApi;
pub use types::{
    FeeUtxo, NftConfig, Outpoint, SigHashDescriptor, SignatureItem, TokenIdentity, TokenKind,
    TokenUtxo,
};

/// Number of oracle signers a standard deployment configures.
pub const SIGNER_NUM: usize = 5;

/// Number of signer attestations required per operation.
pub const SIGNER_VERIFY_NUM: usize = 3;
