//! Fuzz target for Message::decode_raw
//!
//! Feeds arbitrary bytes under every kind discriminant, known or not:
//! - Malformed CBOR data
//! - Requests decoded as responses and vice versa
//! - Unknown kinds
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use xorbit_proto::{Message, MessageKind};

fuzz_target!(|input: (u16, &[u8])| {
    let (raw_kind, data) = input;

    let _ = Message::decode_raw(raw_kind, data);

    for kind in [MessageKind::Request, MessageKind::Response, MessageKind::Error] {
        if let Ok(message) = Message::decode(kind, data) {
            // Anything that decodes must re-encode and decode to itself
            let bytes = message.to_vec().unwrap();
            assert_eq!(Message::decode(kind, &bytes).unwrap(), message);
        }
    }
});
