//! Error types for the transfer protocol.
//!
//! Validation errors (choice, counts, commitment, parameters) fire before
//! any cryptographic work, so a rejected call never produces partial key
//! material. Primitive failures carry the layer (and branch) they came from.
//! Nothing here is retried: a malformed key or a corrupted sealed box fails
//! identically every time.

use thiserror::Error;
use xorbit_crypto::CryptoError;
use xorbit_proto::ErrorPayload;

use crate::params::ParamsError;

/// Errors raised by [`crate::ot_request`], [`crate::ot_send`] and
/// [`crate::ReceiverSession`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtError {
    /// Choice was not an integer
    #[error("choice must be an integer, got {found}")]
    InvalidChoiceType {
        /// Type of the rejected value
        found: &'static str,
    },

    /// Choice outside `0..2^k`
    #[error("choice {choice} is out of range 0..={max}")]
    ChoiceOutOfRange {
        /// Rejected choice
        choice: i128,
        /// Largest valid choice
        max: u32,
    },

    /// Commitment does not match the public keys in the request
    #[error("commitment does not match provided public keys")]
    CommitmentMismatch,

    /// Sender was given the wrong number of messages
    #[error("number of plaintexts must be {expected}, got {actual}")]
    InvalidPlaintextCount {
        /// Messages required by the parameters
        expected: usize,
        /// Messages given
        actual: usize,
    },

    /// Request carries the wrong number of public keys
    #[error("number of public keys must be {expected}, got {actual}")]
    InvalidPublicKeyCount {
        /// Keys required by the parameters
        expected: usize,
        /// Keys in the request
        actual: usize,
    },

    /// A branch key could not be sealed
    #[error("encryption failed for layer {layer} branch {branch}: {source}")]
    EncryptionFailure {
        /// Layer of the failing key
        layer: usize,
        /// Branch (bit value) of the failing key
        branch: u8,
        /// Primitive failure
        #[source]
        source: CryptoError,
    },

    /// A branch key could not be opened
    #[error("decryption failed for layer {layer}: {source}")]
    DecryptionFailure {
        /// Layer of the failing key
        layer: usize,
        /// Primitive failure
        #[source]
        source: CryptoError,
    },

    /// A message is longer than a combined key can mask
    #[error("plaintext {index} is {len} bytes, longer than the {max}-byte limit")]
    PlaintextTooLong {
        /// Index of the offending message
        index: usize,
        /// Its length
        len: usize,
        /// Longest message that can be masked
        max: usize,
    },

    /// Encoded response would exceed the wire size limit
    #[error("response would be {size} bytes encoded, over the {max}-byte message limit")]
    ResponseTooLarge {
        /// Encoded size of the response
        size: usize,
        /// Largest message a receiver accepts
        max: usize,
    },

    /// Response does not have the shape the parameters require
    #[error("malformed response: {reason}")]
    MalformedResponse {
        /// What was wrong
        reason: String,
    },

    /// The session holds no secret key for this branch
    #[error("no secret key for layer {layer} branch {branch}")]
    BranchKeyUnavailable {
        /// Requested layer
        layer: usize,
        /// Requested branch
        branch: u8,
    },

    /// Parameters are unusable
    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] ParamsError),
}

impl OtError {
    /// Returns true if the caller's input was rejected before any
    /// cryptographic work began.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidChoiceType { .. }
                | Self::ChoiceOutOfRange { .. }
                | Self::CommitmentMismatch
                | Self::InvalidPlaintextCount { .. }
                | Self::InvalidPublicKeyCount { .. }
                | Self::PlaintextTooLong { .. }
                | Self::InvalidParams(_)
        )
    }

    /// Wire error code for reporting a rejected request to the receiver.
    pub fn error_code(&self) -> u16 {
        match self {
            Self::CommitmentMismatch => ErrorPayload::COMMITMENT_MISMATCH,
            Self::InvalidPlaintextCount { .. } => ErrorPayload::INVALID_PLAINTEXT_COUNT,
            Self::InvalidPublicKeyCount { .. } => ErrorPayload::INVALID_PUBLIC_KEY_COUNT,
            Self::EncryptionFailure { .. } => ErrorPayload::ENCRYPTION_FAILED,
            Self::PlaintextTooLong { .. } => ErrorPayload::PLAINTEXT_TOO_LONG,
            Self::ResponseTooLarge { .. } => ErrorPayload::RESPONSE_TOO_LARGE,
            Self::InvalidChoiceType { .. }
            | Self::ChoiceOutOfRange { .. }
            | Self::DecryptionFailure { .. }
            | Self::MalformedResponse { .. }
            | Self::BranchKeyUnavailable { .. }
            | Self::InvalidParams(_) => ErrorPayload::INTERNAL,
        }
    }
}

/// Convert a sender-side rejection into the payload sent back to the
/// receiver.
impl From<&OtError> for ErrorPayload {
    fn from(err: &OtError) -> Self {
        Self::new(err.error_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_classified() {
        assert!(OtError::CommitmentMismatch.is_validation());
        assert!(OtError::InvalidChoiceType { found: "float" }.is_validation());
        assert!(OtError::InvalidPlaintextCount { expected: 8, actual: 7 }.is_validation());

        let crypto = OtError::EncryptionFailure {
            layer: 1,
            branch: 0,
            source: CryptoError::MalformedPublicKey { len: 3 },
        };
        assert!(!crypto.is_validation());
    }

    #[test]
    fn error_payload_carries_code_and_message() {
        let payload = ErrorPayload::from(&OtError::CommitmentMismatch);

        assert_eq!(payload.code, ErrorPayload::COMMITMENT_MISMATCH);
        assert_eq!(payload.message, "commitment does not match provided public keys");
    }

    #[test]
    fn oversized_response_has_its_own_code() {
        let err = OtError::ResponseTooLarge { size: 2_000_000, max: 1_048_576 };

        assert!(!err.is_validation());
        assert_eq!(ErrorPayload::from(&err).code, ErrorPayload::RESPONSE_TOO_LARGE);
    }

    #[test]
    fn public_key_count_message_names_both_counts() {
        let err = OtError::InvalidPublicKeyCount { expected: 3, actual: 2 };
        assert_eq!(err.to_string(), "number of public keys must be 3, got 2");
    }

    #[test]
    fn encryption_failure_message_names_layer() {
        let err = OtError::EncryptionFailure {
            layer: 2,
            branch: 1,
            source: CryptoError::NonContributory,
        };

        assert!(err.to_string().starts_with("encryption failed for layer 2 branch 1"));
    }
}
