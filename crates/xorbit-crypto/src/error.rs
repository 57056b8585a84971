//! Error types for the cryptographic primitives.

use thiserror::Error;

/// Errors produced by sealing, opening, masking and commitment parsing.
///
/// None of these are transient. A malformed key or a tampered sealed box
/// fails the same way on every attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Public key bytes are not a 32-byte X25519 key
    #[error("malformed public key: expected 32 bytes, got {len}")]
    MalformedPublicKey {
        /// Length of the rejected encoding
        len: usize,
    },

    /// Key agreement produced the all-zero secret (low-order point)
    #[error("key agreement is not contributory")]
    NonContributory,

    /// Sealed box is shorter than its fixed overhead
    #[error("malformed sealed box: {len} bytes is shorter than the {min}-byte overhead")]
    MalformedCiphertext {
        /// Length of the rejected sealed box
        len: usize,
        /// Minimum length of any sealed box
        min: usize,
    },

    /// AEAD tag did not verify (wrong key or tampered ciphertext)
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Message is longer than a mask can be stretched
    #[error("message of {len} bytes exceeds the {max}-byte mask limit")]
    MaskTooLong {
        /// Length of the message
        len: usize,
        /// Longest message that can be masked
        max: usize,
    },

    /// Branch keys of one combination differ in length
    #[error("branch key length mismatch: expected {expected}, got {actual}")]
    KeyLengthMismatch {
        /// Length of the first key in the combination
        expected: usize,
        /// Length of the offending key
        actual: usize,
    },

    /// No branch keys were given to combine
    #[error("cannot combine an empty set of branch keys")]
    EmptyCombination,

    /// Commitment text is not 32 bytes of hex
    #[error("malformed commitment: {reason}")]
    MalformedCommitment {
        /// Why parsing failed
        reason: String,
    },
}
