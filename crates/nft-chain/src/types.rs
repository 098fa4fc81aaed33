//! Chain API data types.

use serde::{Deserialize, Serialize};

/// Configuration for a [`ChainClient`](crate::ChainClient).
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Base URL of the indexer API.
    pub base_url: String,
    /// Optional authentication token sent via the `token` header.
    pub token: Option<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.sensiblequery.com".to_string(),
            token: None,
        }
    }
}

/// A plain value-carrying UTXO usable for fees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoRecord {
    /// Txid in display order.
    #[serde(rename = "txId")]
    pub txid: String,
    /// Output index within the transaction.
    #[serde(rename = "outputIndex")]
    pub output_index: u32,
    /// Value in satoshis.
    pub satoshis: u64,
    /// Owning address string.
    pub address: String,
}

/// A live protocol token UTXO as reported by the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUtxoRecord {
    /// Txid in display order.
    #[serde(rename = "txId")]
    pub txid: String,
    /// Output index within the transaction.
    #[serde(rename = "outputIndex")]
    pub output_index: u32,
    /// Value in satoshis.
    pub satoshis: u64,
    /// Codehash of the series (hex).
    pub codehash: String,
    /// Genesis identifier of the series (hex).
    pub genesis: String,
    /// Current owner address string.
    pub address: String,
    /// Token ordinal. For the mint slot this is the next ordinal to issue.
    #[serde(rename = "tokenIndex")]
    pub token_index: u64,
    /// Total supply fixed at genesis.
    #[serde(rename = "totalSupply")]
    pub total_supply: u64,
    /// Whether this is the series' mint-slot (genesis) output.
    #[serde(rename = "isMintSlot")]
    pub is_mint_slot: bool,
}

/// Broadcast response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastResponse {
    /// Txid of the accepted transaction, if accepted.
    #[serde(default)]
    pub txid: Option<String>,
    /// Rejection detail, if refused.
    #[serde(default)]
    pub error: Option<String>,
}
