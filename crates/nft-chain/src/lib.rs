#![deny(missing_docs)]
//! Chain data and broadcast API for the Sensible NFT SDK.
//!
//! Defines the [`ChainApi`] trait the protocol engine queries for UTXO
//! state and broadcasts through, plus [`ChainClient`], an HTTP
//! implementation against a Sensible-style indexer API. The engine never
//! assumes stricter consistency than confirmed-or-mempool-visible state
//! at query time.

pub mod client;
pub mod error;
pub mod types;

pub use client::ChainClient;
pub use error::ChainError;
pub use types::{ChainConfig, TokenUtxoRecord, UtxoRecord};

use std::future::Future;

/// Read and broadcast access to the chain.
///
/// Implemented by [`ChainClient`] for production use and by the in-memory
/// mock chain in `nft-core` for tests; the engine is generic over this
/// trait, so both are injected the same way.
pub trait ChainApi {
    /// List spendable plain (P2PKH) UTXOs for an address.
    fn list_utxos(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Vec<UtxoRecord>, ChainError>> + Send;

    /// List live protocol token UTXOs of a series owned by an address.
    ///
    /// Includes the series' mint-slot output when the address is the
    /// issuer's.
    fn list_token_utxos(
        &self,
        codehash: &str,
        genesis: &str,
        address: &str,
    ) -> impl Future<Output = Result<Vec<TokenUtxoRecord>, ChainError>> + Send;

    /// Fetch the raw transaction hex for a txid (display order).
    fn get_raw_tx(
        &self,
        txid: &str,
    ) -> impl Future<Output = Result<String, ChainError>> + Send;

    /// Broadcast a raw transaction hex; returns the txid on acceptance.
    fn broadcast(
        &self,
        raw_tx_hex: &str,
    ) -> impl Future<Output = Result<String, ChainError>> + Send;
}
