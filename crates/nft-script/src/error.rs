//! Script-layer error types.

/// Errors that can occur when building or parsing scripts and addresses.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// A hex string could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// A push payload exceeds the OP_PUSHDATA4 limit.
    #[error("push data too large")]
    DataTooBig,

    /// Script bytes ended inside a push operation.
    #[error("script truncated inside a push")]
    DataTooSmall,

    /// An address string was malformed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// An address payload had the wrong length.
    #[error("invalid address length for '{0}'")]
    InvalidAddressLength(String),

    /// An address version byte was not a known P2PKH prefix.
    #[error("unsupported address '{0}'")]
    UnsupportedAddress(String),

    /// A Base58Check checksum did not match.
    #[error("address checksum mismatch")]
    ChecksumFailed,
}
