//! Property-based tests for message encoding/decoding
//!
//! Decoding faces untrusted peer bytes, so the interesting properties are
//! that nothing panics on garbage and that every kind tag is honored.

use proptest::prelude::*;
use xorbit_proto::{
    EncryptedBranchPair, ErrorPayload, MAX_MESSAGE_SIZE, Message, MessageKind, OtRequest,
    OtResponse, ProtocolError,
};

fn arbitrary_kind() -> impl Strategy<Value = MessageKind> {
    prop_oneof![
        Just(MessageKind::Request),
        Just(MessageKind::Response),
        Just(MessageKind::Error),
    ]
}

fn arbitrary_request() -> impl Strategy<Value = OtRequest> {
    (
        prop::collection::vec(prop::collection::vec(any::<u8>(), 32..=32), 1..8),
        prop::collection::vec(any::<u8>(), 0..40),
    )
        .prop_map(|(public_keys, commitment)| OtRequest { public_keys, commitment })
}

fn arbitrary_response() -> impl Strategy<Value = OtResponse> {
    (
        prop::collection::vec(
            (prop::collection::vec(any::<u8>(), 0..120), prop::collection::vec(any::<u8>(), 0..120))
                .prop_map(|(zero, one)| EncryptedBranchPair { zero, one }),
            1..5,
        ),
        prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 2..17),
    )
        .prop_map(|(encrypted_key_pairs, ciphertexts)| OtResponse {
            encrypted_key_pairs,
            ciphertexts,
        })
}

#[test]
fn prop_request_round_trip() {
    proptest!(|(request in arbitrary_request())| {
        let message = Message::Request(request);
        let bytes = message.to_vec().expect("encode should succeed");

        let decoded = Message::decode(MessageKind::Request, &bytes).expect("decode should succeed");

        // PROPERTY: Round-trip must be identity
        prop_assert_eq!(decoded, message);
    });
}

#[test]
fn prop_response_round_trip() {
    proptest!(|(response in arbitrary_response())| {
        let message = Message::Response(response);
        let bytes = message.to_vec().expect("encode should succeed");

        let decoded = Message::decode(message.kind(), &bytes).expect("decode should succeed");

        prop_assert_eq!(decoded, message);
    });
}

#[test]
fn prop_garbage_never_panics() {
    proptest!(|(kind in arbitrary_kind(), bytes in prop::collection::vec(any::<u8>(), 0..512))| {
        // PROPERTY: Any input either decodes or returns an error
        let _ = Message::decode(kind, &bytes);
    });
}

#[test]
fn prop_unknown_kinds_rejected() {
    proptest!(|(raw in any::<u16>())| {
        prop_assume!(MessageKind::from_u16(raw).is_none());

        let result = Message::decode_raw(raw, &[]);

        prop_assert_eq!(result, Err(ProtocolError::UnknownKind(raw)));
    });
}

#[test]
fn request_never_decodes_as_error_payload() {
    let request = OtRequest { public_keys: vec![vec![7; 32]], commitment: vec![9; 32] };
    let bytes = Message::Request(request).to_vec().unwrap();

    assert!(Message::decode(MessageKind::Error, &bytes).is_err());
}

#[test]
fn size_limit_is_inclusive() {
    // A payload of exactly MAX_MESSAGE_SIZE passes the size gate and fails
    // in the parser instead.
    let bytes = vec![0xFFu8; MAX_MESSAGE_SIZE];

    let result = Message::decode(MessageKind::Request, &bytes);

    assert!(matches!(result, Err(ProtocolError::CborDecode(_))));
}

#[test]
fn error_payload_fixture_encoding_is_stable() {
    let message = Message::Error(ErrorPayload::new(ErrorPayload::COMMITMENT_MISMATCH, "x"));

    let bytes = message.to_vec().unwrap();

    // {"code": 1, "message": "x"}
    assert_eq!(hex::encode(bytes), "a264636f646501676d6573736167656178");
}
