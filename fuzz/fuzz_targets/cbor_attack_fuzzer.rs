//! Fuzz target for CBOR deserialization attacks
//!
//! # Strategy
//!
//! - Deeply nested: arrays nested to arbitrary depth inside a request field
//! - Huge lengths: CBOR claiming massive byte/array lengths for key lists
//! - Random bytes: completely arbitrary CBOR data
//! - Duplicate keys: maps repeating the `commitment` field
//!
//! # Invariants
//!
//! - Huge claimed lengths rejected (not allocated)
//! - Deeply nested structures handled gracefully
//! - NEVER panic on malformed CBOR

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use xorbit_proto::{Message, MessageKind};

#[derive(Debug, Clone, Arbitrary)]
enum CborAttack {
    DeeplyNested { depth: u8 },
    HugeLength { claimed_len_exponent: u8 },
    RandomBytes { bytes: Vec<u8> },
    DuplicateKeys { count: u8 },
}

const KINDS: [MessageKind; 3] = [MessageKind::Request, MessageKind::Response, MessageKind::Error];

fuzz_target!(|attack: CborAttack| {
    match attack {
        CborAttack::DeeplyNested { depth } => {
            let bytes = nested_public_keys((depth % 64) as usize);
            for kind in KINDS {
                let _ = Message::decode(kind, &bytes);
            }
        },

        CborAttack::HugeLength { claimed_len_exponent } => {
            let exponent = u32::from(claimed_len_exponent % 33);
            let claimed = if exponent < 32 { 1u32 << exponent } else { u32::MAX };

            for bytes in [huge_byte_string(claimed), huge_array(claimed)] {
                for kind in KINDS {
                    let _ = Message::decode(kind, &bytes);
                }
            }
        },

        CborAttack::RandomBytes { bytes } => {
            for kind in KINDS {
                let _ = Message::decode(kind, &bytes);
            }
        },

        CborAttack::DuplicateKeys { count } => {
            let count = (count % 10).max(2);
            let mut bytes = vec![0xA0 | count];
            for _ in 0..count {
                bytes.push(0x6A);
                bytes.extend_from_slice(b"commitment");
                bytes.push(0x40);
            }

            let _ = Message::decode(MessageKind::Request, &bytes);
        },
    }
});

/// `{"public_keys": [[[ ... ]]]}`
fn nested_public_keys(depth: usize) -> Vec<u8> {
    let mut bytes = vec![0xA1, 0x6B];
    bytes.extend_from_slice(b"public_keys");
    bytes.extend(std::iter::repeat(0x81).take(depth));
    bytes.push(0x40);
    bytes
}

/// `{"public_keys": [h'...']}` claiming `claimed` bytes.
fn huge_byte_string(claimed: u32) -> Vec<u8> {
    let mut bytes = vec![0xA1, 0x6B];
    bytes.extend_from_slice(b"public_keys");
    bytes.push(0x81);
    bytes.push(0x5A);
    bytes.extend_from_slice(&claimed.to_be_bytes());
    bytes.extend(vec![0xAA; (claimed as usize).min(10)]);
    bytes
}

/// `{"ciphertexts": [...]}` claiming `claimed` elements.
fn huge_array(claimed: u32) -> Vec<u8> {
    let mut bytes = vec![0xA1, 0x6B];
    bytes.extend_from_slice(b"ciphertexts");
    bytes.push(0x9A);
    bytes.extend_from_slice(&claimed.to_be_bytes());
    for _ in 0..(claimed as usize).min(5) {
        bytes.push(0x40);
    }
    bytes
}
