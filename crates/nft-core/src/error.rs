//! Protocol error types.
//!
//! Every lifecycle failure maps to one of these kinds, carrying the
//! offending identifier so callers can decide whether to retry, re-fund,
//! or abort. Nothing is retried internally and nothing is broadcast on
//! any failure path before the broadcast step itself.

use nft_chain::ChainError;
use nft_oracle::OracleError;
use nft_primitives::PrimitivesError;
use nft_script::ScriptError;
use nft_transaction::TransactionError;

/// Errors produced by the protocol engine.
#[derive(Debug, thiserror::Error)]
pub enum NftError {
    /// The requested total supply was zero or unparseable.
    #[error("invalid supply: {0}")]
    InvalidSupply(String),

    /// A token index string could not be parsed.
    #[error("invalid token index: {0}")]
    InvalidTokenIndex(String),

    /// All ordinals of the series have been issued.
    #[error("supply exhausted for series {genesis}: all {total_supply} tokens issued")]
    SupplyExhausted {
        /// Genesis identifier of the series.
        genesis: String,
        /// The fixed total supply.
        total_supply: u64,
    },

    /// No live mint slot exists for the series identity.
    #[error("series {codehash}/{genesis} not found")]
    SeriesNotFound {
        /// Codehash of the requested series.
        codehash: String,
        /// Genesis identifier of the requested series.
        genesis: String,
    },

    /// No live token UTXO carries the requested ordinal.
    #[error("token {token_index} of series {genesis} not found")]
    TokenNotFound {
        /// The requested ordinal.
        token_index: u64,
        /// Genesis identifier of the series.
        genesis: String,
    },

    /// The token exists but the sender does not own it.
    #[error("token {token_index} is owned by {owner}, not {sender}")]
    NotOwner {
        /// The requested ordinal.
        token_index: u64,
        /// The current owner address.
        owner: String,
        /// The address derived from the sender credential.
        sender: String,
    },

    /// Selected fee UTXOs cannot cover outputs plus fee.
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds {
        /// Satoshis required.
        needed: u64,
        /// Satoshis available within the UTXO bound.
        available: u64,
    },

    /// The oracle quorum could not produce a fully verified attestation.
    #[error("oracle verification failed: {0}")]
    OracleVerifyFailed(String),

    /// `sign` received a different number of signatures than descriptors.
    #[error("signature count mismatch: {expected} descriptors, {actual} signatures")]
    SignatureCountMismatch {
        /// Descriptor count.
        expected: usize,
        /// Signature count.
        actual: usize,
    },

    /// An injected signature did not verify against its descriptor.
    #[error("signature for input {input_index} failed verification")]
    SignatureVerifyFailed {
        /// Index of the offending input.
        input_index: u32,
    },

    /// The chain refused the transaction.
    #[error("broadcast rejected: {0}")]
    BroadcastRejected(String),

    /// A chain or oracle round-trip failed at the transport level.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// The engine configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Primitives error.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),

    /// Script error.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Transaction error.
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

impl From<ChainError> for NftError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Rejected(reason) => NftError::BroadcastRejected(reason),
            other => NftError::NetworkUnavailable(other.to_string()),
        }
    }
}

impl From<OracleError> for NftError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::Http(e) => NftError::NetworkUnavailable(e.to_string()),
            OracleError::Server {
                status_code,
                message,
            } => NftError::NetworkUnavailable(format!("oracle ({status_code}): {message}")),
            OracleError::InvalidSelection(reason) => NftError::InvalidConfig(reason),
            other => NftError::OracleVerifyFailed(other.to_string()),
        }
    }
}
