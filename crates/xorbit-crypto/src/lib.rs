//! Xorbit Cryptographic Primitives
//!
//! Cryptographic building blocks for the layered oblivious transfer. Pure
//! functions with deterministic outputs. Callers provide random bytes so
//! tests can replay a session byte for byte.
//!
//! # Key Lifecycle
//!
//! One transfer moves `2^k` messages through `k` layers. Every layer is an
//! independent 1-of-2 transfer of a branch key; the branch keys selected by
//! the bits of an index XOR into the combined key that masks that message.
//!
//! ```text
//! Receiver layer key pairs ──► commitment (SHA-256 over public keys)
//!        │
//!        ▼
//! Sender branch keys (2 per layer) ──► seal to layer public key
//!        │
//!        ▼
//! XOR of selected branch keys ──► HKDF mask ──► masked message
//! ```
//!
//! Secret keys, branch keys and combined keys are wiped on drop. A receiver
//! session is expected to open its branch keys once and then discard every
//! secret it holds.
//!
//! # Security
//!
//! Binding:
//! - The commitment fixes the ordered public keys before the sender encrypts
//! - Comparison against a candidate digest runs in constant time
//!
//! Sealing:
//! - Fresh ephemeral X25519 key per sealed box
//! - HKDF binds the AEAD key to both public keys
//! - XChaCha20-Poly1305 rejects any tampered sealed box
//! - Low-order points are rejected on both sides
//!
//! Masking:
//! - Messages are masked, not authenticated; a corrupted masked message
//!   unmasks to garbage

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod branch;
pub mod commitment;
mod error;
pub mod hybrid;

pub use branch::{BranchKey, CombinedKey, MAX_MASK_LEN};
pub use commitment::{COMMITMENT_SIZE, Commitment, commit};
pub use error::CryptoError;
pub use hybrid::{
    LayerKeyPair, LayerPublicKey, NONCE_SIZE, PUBLIC_KEY_SIZE, SEAL_OVERHEAD, SECRET_KEY_SIZE,
    SealRandomness, open, seal,
};
