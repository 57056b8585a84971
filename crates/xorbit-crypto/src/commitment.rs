//! Commitment over the receiver's ordered public keys.
//!
//! The receiver publishes `SHA-256(pk_0 || pk_1 || ... || pk_n)` next to the
//! keys themselves. The sender recomputes the digest over the keys it
//! actually received and refuses to encrypt anything when the two differ.
//!
//! Keys are hashed in their canonical encoding (the raw bytes carried on the
//! wire), so both parties hash identical input without re-serializing.

use std::fmt;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::CryptoError;

/// Size of a commitment digest in bytes (SHA-256)
pub const COMMITMENT_SIZE: usize = 32;

/// Digest binding an ordered list of public keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Commitment([u8; COMMITMENT_SIZE]);

impl Commitment {
    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; COMMITMENT_SIZE] {
        &self.0
    }

    /// Constant-time comparison against a digest received from a peer.
    ///
    /// Candidates of the wrong length never match.
    pub fn verify(&self, candidate: &[u8]) -> bool {
        self.0[..].ct_eq(candidate).into()
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 64-character hex digest.
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(text)
            .map_err(|e| CryptoError::MalformedCommitment { reason: e.to_string() })?;

        let digest: [u8; COMMITMENT_SIZE] =
            bytes.try_into().map_err(|bytes: Vec<u8>| CryptoError::MalformedCommitment {
                reason: format!("expected {COMMITMENT_SIZE} bytes, got {}", bytes.len()),
            })?;

        Ok(Self(digest))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", self.to_hex())
    }
}

/// Commit to an ordered list of encoded public keys.
///
/// Concatenates the encodings in input order and hashes the result. Pure:
/// the same keys in the same order always produce the same commitment.
pub fn commit<K: AsRef<[u8]>>(public_keys: &[K]) -> Commitment {
    let mut hasher = Sha256::new();
    for key in public_keys {
        hasher.update(key.as_ref());
    }
    Commitment(hasher.finalize().into())
}
