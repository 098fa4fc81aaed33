//! Transaction-layer error types.

use nft_primitives::PrimitivesError;
use nft_script::ScriptError;

/// Errors that can occur when building, serializing, or signing
/// transactions.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The transaction bytes were malformed.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// The transaction structure was invalid for the requested operation.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    /// An input could not be signed.
    #[error("signing error: {0}")]
    SigningError(String),

    /// Primitives error.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),

    /// Script error.
    #[error(transparent)]
    Script(#[from] ScriptError),
}
