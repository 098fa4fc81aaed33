//! Primitive-layer error types.

/// Errors that can occur in the primitives layer.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    /// A hex string could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// A private key scalar was malformed or out of range.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// A public key point was malformed or not on the curve.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// An ECDSA signature was malformed or failed to encode.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// A WIF string was malformed.
    #[error("invalid WIF: {0}")]
    InvalidWif(String),

    /// A Base58Check checksum did not match.
    #[error("checksum mismatch")]
    ChecksumMismatch,

    /// A 32-byte hash value was malformed.
    #[error("invalid hash: {0}")]
    InvalidHash(String),

    /// A read past the end of the input buffer.
    #[error("unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// A Rabin key was malformed (wrong residue class, non-prime layout, etc.).
    #[error("invalid Rabin key: {0}")]
    InvalidRabinKey(String),

    /// Rabin signing could not find a valid padding within the search bound.
    #[error("Rabin signing failed: {0}")]
    RabinSigningFailed(String),
}
