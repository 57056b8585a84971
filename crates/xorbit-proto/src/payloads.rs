//! Request, response and error payloads.

use serde::{Deserialize, Serialize};

/// Receiver's request.
///
/// Reveals nothing about the receiver's choice: the public keys are fresh
/// and uniformly distributed whatever index was selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtRequest {
    /// Canonical encodings of the receiver's public keys, layer by layer.
    /// One key per layer, or two per layer (branch 0 then branch 1) under
    /// the per-branch key layout.
    pub public_keys: Vec<Vec<u8>>,

    /// SHA-256 over the concatenated `public_keys`.
    pub commitment: Vec<u8>,
}

/// Both sealed branch keys of one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBranchPair {
    /// Branch key for bit value 0, sealed to the layer's public key
    pub zero: Vec<u8>,
    /// Branch key for bit value 1, sealed to the layer's public key
    pub one: Vec<u8>,
}

impl EncryptedBranchPair {
    /// Sealed key for the given bit value.
    pub fn branch(&self, bit: bool) -> &[u8] {
        if bit { &self.one } else { &self.zero }
    }
}

/// Sender's response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtResponse {
    /// One pair of sealed branch keys per layer, in layer order
    pub encrypted_key_pairs: Vec<EncryptedBranchPair>,

    /// Masked messages, indexed by choice
    pub ciphertexts: Vec<Vec<u8>>,
}

impl OtResponse {
    /// Exact encoded size of this response as a [`crate::Message`] payload.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::CborEncode` if serialization fails
    pub fn encoded_len(&self) -> crate::Result<usize> {
        crate::message::encoded_len(self)
    }
}

/// Error payload sent when a request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Error code identifying the type of error.
    pub code: u16,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorPayload {
    /// Commitment did not match the public keys.
    pub const COMMITMENT_MISMATCH: u16 = 0x0001;
    /// Sender holds the wrong number of messages for its parameters.
    pub const INVALID_PLAINTEXT_COUNT: u16 = 0x0002;
    /// Request carries the wrong number of public keys.
    pub const INVALID_PUBLIC_KEY_COUNT: u16 = 0x0003;
    /// A public key could not be used for encryption.
    pub const ENCRYPTION_FAILED: u16 = 0x0004;
    /// A message is too long to be masked.
    pub const PLAINTEXT_TOO_LONG: u16 = 0x0005;
    /// The response would exceed the wire size limit.
    pub const RESPONSE_TOO_LARGE: u16 = 0x0006;
    /// Anything else.
    pub const INTERNAL: u16 = 0x00FF;

    /// Create an error payload with the given code.
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}
