//! Oracle error types.

use nft_primitives::PrimitivesError;
use nft_transaction::TransactionError;

/// Errors that can occur during oracle attestation.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Server returned a non-2xx response.
    #[error("oracle server error ({status_code}): {message}")]
    Server {
        /// HTTP status code.
        status_code: u16,
        /// Error message from the server.
        message: String,
    },

    /// The signer declined to attest the output.
    #[error("attestation refused: {0}")]
    AttestationRefused(String),

    /// A returned signature did not verify against the signer's key.
    #[error("signature from signer {signer_index} failed verification")]
    VerifyFailed {
        /// Index of the offending signer within the quorum.
        signer_index: usize,
    },

    /// The selected signer subset violates the quorum arity rules.
    #[error("invalid signer selection: {0}")]
    InvalidSelection(String),

    /// Primitives error.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),

    /// Transaction error while checking the prior transaction.
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}
