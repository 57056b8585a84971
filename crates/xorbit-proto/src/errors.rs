//! Protocol error types.

use thiserror::Error;

/// Errors raised while encoding or decoding wire messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// CBOR serialization failed
    #[error("CBOR encode failed: {0}")]
    CborEncode(String),

    /// CBOR deserialization failed
    #[error("CBOR decode failed: {0}")]
    CborDecode(String),

    /// Encoded message exceeds [`crate::MAX_MESSAGE_SIZE`]
    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge {
        /// Size of the rejected message
        size: usize,
        /// Maximum accepted size
        max: usize,
    },

    /// Discriminant does not name a known message kind
    #[error("unknown message kind: {0:#06x}")]
    UnknownKind(u16),
}

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
