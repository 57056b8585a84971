//! Xorbit wire protocol.
//!
//! One transfer is exactly one round trip:
//!
//! ```text
//! Receiver                                Sender
//!    │  Request { public_keys, commitment }  │
//!    │ ─────────────────────────────────────►│
//!    │  Response { encrypted_key_pairs,      │
//!    │             ciphertexts }             │
//!    │ ◄─────────────────────────────────────│
//! ```
//!
//! A sender that rejects a request answers with an [`ErrorPayload`] instead.
//!
//! Messages are CBOR-encoded. The [`MessageKind`] travels out of band (in
//! whatever framing the transport provides), so only the inner struct is
//! serialized. This crate knows nothing about keys or ciphers; it moves
//! opaque byte strings and checks sizes.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
pub mod kind;
pub mod message;
pub mod payloads;

pub use errors::{ProtocolError, Result};
pub use kind::MessageKind;
pub use message::{MAX_MESSAGE_SIZE, Message};
pub use payloads::{EncryptedBranchPair, ErrorPayload, OtRequest, OtResponse};
