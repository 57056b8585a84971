//! Layered 1-of-2^k oblivious transfer.
//!
//! A sender holds `2^k` messages; a receiver learns the one at its secret
//! index and the sender learns nothing about which. The transfer is built
//! from `k` layered 1-of-2 transfers: the sender draws two random branch
//! keys per layer, seals each to the receiver's public keys, and masks
//! message `i` with the XOR of the branch keys selected by the bits of `i`.
//! The receiver can open one branch per layer, so it rebuilds exactly one
//! combined key.
//!
//! # Flow
//!
//! ```text
//! Receiver                                   Sender
//!    │ ot_request(params, choice, rng)          │
//!    │ ── OtRequest { public_keys, commitment } ─►
//!    │                                          │ ot_send(params, plaintexts, request, rng)
//!    │ ◄─ OtResponse { encrypted_key_pairs, ciphertexts } ──
//!    │ session.receive(&response)               │
//! ```
//!
//! # Example
//!
//! ```
//! use rand::rngs::OsRng;
//! use xorbit_core::{Choice, OtParams, ot_request, ot_send};
//!
//! let params = OtParams::default();
//! let plaintexts: Vec<Vec<u8>> = (0..8).map(|i| format!("m{i}").into_bytes()).collect();
//!
//! let choice = Choice::new(5, params.layers)?;
//! let (session, request) = ot_request(&params, choice, &mut OsRng)?;
//! let response = ot_send(&params, &plaintexts, &request, &mut OsRng)?;
//!
//! assert_eq!(session.receive(&response)?, b"m5");
//! # Ok::<(), xorbit_core::OtError>(())
//! ```
//!
//! # Security
//!
//! Under the default [`KeyLayout::SharedPerLayer`] both branch keys of a
//! layer are sealed to one public key, so the receiver can open every
//! branch and unmask every message. Use [`KeyLayout::PerBranch`] when
//! sender privacy against an honest receiver matters. Messages carry no
//! integrity protection.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod choice;
mod error;
mod params;
mod receiver;
mod sender;

pub use choice::{Choice, index_from_bits};
pub use error::OtError;
pub use params::{KeyLayout, MAX_KEY_LEN, MAX_LAYERS, MIN_KEY_LEN, OtParams, ParamsError};
pub use receiver::{ReceiverSession, ot_request};
pub use sender::ot_send;
