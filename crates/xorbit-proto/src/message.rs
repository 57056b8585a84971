//! CBOR-encoded protocol messages.
//!
//! # Invariants
//!
//! Each message variant maps to exactly one [`MessageKind`] (enforced by
//! match exhaustiveness). Round-trip encoding must produce identical values.

use std::io;

use bytes::BufMut;
use serde::Serialize;

use crate::{
    MessageKind,
    errors::{ProtocolError, Result},
    payloads::{ErrorPayload, OtRequest, OtResponse},
};

/// Largest encoded message accepted by [`Message::decode`] (1 MiB).
///
/// Byte strings are encoded as CBOR arrays of small integers, so a payload
/// byte costs up to two bytes on the wire. A response carries all `2^k`
/// masked messages: default parameters (8 messages) fit messages of tens of
/// kilobytes, while at twelve layers (4096 messages) only about 120 bytes
/// per message fit. Senders must check [`Message::encoded_len`] (or
/// [`OtResponse::encoded_len`]) against this limit before sending.
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// All messages exchanged by the two parties.
///
/// Only the inner struct is serialized; the variant is identified by the
/// [`MessageKind`] carried next to the bytes. A request can therefore never
/// be decoded as a response by accident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Receiver request
    Request(OtRequest),
    /// Sender response
    Response(OtResponse),
    /// Sender rejection
    Error(ErrorPayload),
}

impl Message {
    /// Kind corresponding to this message.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::Request(_) => MessageKind::Request,
            Self::Response(_) => MessageKind::Response,
            Self::Error(_) => MessageKind::Error,
        }
    }

    /// Encode the inner payload to `dst`.
    ///
    /// Does NOT enforce [`MAX_MESSAGE_SIZE`]; the limit is applied on the
    /// decoding side where untrusted bytes arrive.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::CborEncode` if serialization fails
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<()> {
        let mut writer = dst.writer();

        match self {
            Self::Request(inner) => ciborium::ser::into_writer(inner, &mut writer),
            Self::Response(inner) => ciborium::ser::into_writer(inner, &mut writer),
            Self::Error(inner) => ciborium::ser::into_writer(inner, &mut writer),
        }
        .map_err(|e| ProtocolError::CborEncode(e.to_string()))
    }

    /// Exact number of bytes [`Message::encode`] would write.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::CborEncode` if serialization fails
    pub fn encoded_len(&self) -> Result<usize> {
        match self {
            Self::Request(inner) => encoded_len(inner),
            Self::Response(inner) => encoded_len(inner),
            Self::Error(inner) => encoded_len(inner),
        }
    }

    /// Encode into a fresh buffer.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::CborEncode` if serialization fails
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode(&mut buf)?;
        Ok(buf)
    }

    /// Decode a payload of the given kind.
    ///
    /// # Security
    ///
    /// - Size Validation First: the size check happens BEFORE CBOR parsing
    ///   begins, so oversized input is never handed to the parser.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::MessageTooLarge` if bytes exceed [`MAX_MESSAGE_SIZE`]
    /// - `ProtocolError::CborDecode` if CBOR deserialization fails
    pub fn decode(kind: MessageKind, bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_MESSAGE_SIZE {
            return Err(ProtocolError::MessageTooLarge {
                size: bytes.len(),
                max: MAX_MESSAGE_SIZE,
            });
        }

        let message = match kind {
            MessageKind::Request => Self::Request(
                ciborium::de::from_reader(bytes)
                    .map_err(|e| ProtocolError::CborDecode(e.to_string()))?,
            ),
            MessageKind::Response => Self::Response(
                ciborium::de::from_reader(bytes)
                    .map_err(|e| ProtocolError::CborDecode(e.to_string()))?,
            ),
            MessageKind::Error => Self::Error(
                ciborium::de::from_reader(bytes)
                    .map_err(|e| ProtocolError::CborDecode(e.to_string()))?,
            ),
        };

        Ok(message)
    }

    /// Decode using a raw wire discriminant.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::UnknownKind` if `kind` is not a known discriminant
    /// - everything [`Message::decode`] returns
    pub fn decode_raw(kind: u16, bytes: &[u8]) -> Result<Self> {
        let kind = MessageKind::from_u16(kind).ok_or(ProtocolError::UnknownKind(kind))?;
        Self::decode(kind, bytes)
    }
}

/// Serialized size of a payload, without buffering it.
pub(crate) fn encoded_len<T: Serialize>(value: &T) -> Result<usize> {
    let mut counter = ByteCounter(0);
    ciborium::ser::into_writer(value, &mut counter)
        .map_err(|e| ProtocolError::CborEncode(e.to_string()))?;
    Ok(counter.0)
}

/// Writer that discards bytes and counts them.
struct ByteCounter(usize);

impl io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl From<OtRequest> for Message {
    fn from(request: OtRequest) -> Self {
        Self::Request(request)
    }
}

impl From<OtResponse> for Message {
    fn from(response: OtResponse) -> Self {
        Self::Response(response)
    }
}

impl From<ErrorPayload> for Message {
    fn from(error: ErrorPayload) -> Self {
        Self::Error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payloads::EncryptedBranchPair;

    fn sample_response() -> OtResponse {
        OtResponse {
            encrypted_key_pairs: vec![
                EncryptedBranchPair { zero: vec![0xA0; 104], one: vec![0xA1; 104] };
                3
            ],
            ciphertexts: (0..8u8).map(|i| vec![i; 10]).collect(),
        }
    }

    #[test]
    fn response_round_trip() {
        let message = Message::Response(sample_response());

        let bytes = message.to_vec().unwrap();
        let decoded = Message::decode(MessageKind::Response, &bytes).unwrap();

        assert_eq!(decoded, message);
    }

    #[test]
    fn error_round_trip() {
        let message = Message::Error(ErrorPayload::new(
            ErrorPayload::COMMITMENT_MISMATCH,
            "commitment does not match provided public keys",
        ));

        let bytes = message.to_vec().unwrap();
        let decoded = Message::decode(message.kind(), &bytes).unwrap();

        assert_eq!(decoded, message);
    }

    #[test]
    fn oversized_input_rejected_before_parsing() {
        let bytes = vec![0u8; MAX_MESSAGE_SIZE + 1];

        let result = Message::decode(MessageKind::Request, &bytes);

        assert_eq!(
            result.unwrap_err(),
            ProtocolError::MessageTooLarge { size: MAX_MESSAGE_SIZE + 1, max: MAX_MESSAGE_SIZE }
        );
    }

    #[test]
    fn kind_mismatch_fails_decode() {
        let bytes = Message::Response(sample_response()).to_vec().unwrap();

        let result = Message::decode(MessageKind::Request, &bytes);

        assert!(matches!(result, Err(ProtocolError::CborDecode(_))));
    }

    #[test]
    fn unknown_raw_kind_rejected() {
        let result = Message::decode_raw(0x1234, &[]);
        assert_eq!(result.unwrap_err(), ProtocolError::UnknownKind(0x1234));
    }

    #[test]
    fn encoded_len_matches_encoding() {
        let messages = [
            Message::Response(sample_response()),
            Message::Error(ErrorPayload::new(ErrorPayload::INTERNAL, "boom")),
            Message::Request(OtRequest {
                public_keys: vec![vec![0xEE; 32]; 3],
                commitment: vec![7; 32],
            }),
        ];

        for message in messages {
            assert_eq!(message.encoded_len().unwrap(), message.to_vec().unwrap().len());
        }
    }

    #[test]
    fn payload_bytes_cost_up_to_two_wire_bytes() {
        // 0x17 is the largest value CBOR packs into the initial byte
        let small =
            OtResponse { encrypted_key_pairs: Vec::new(), ciphertexts: vec![vec![0x17; 100]] };
        let large =
            OtResponse { encrypted_key_pairs: Vec::new(), ciphertexts: vec![vec![0x18; 100]] };

        assert_eq!(large.encoded_len().unwrap() - small.encoded_len().unwrap(), 100);
    }

    #[test]
    fn truncated_input_fails_decode() {
        let bytes = Message::Response(sample_response()).to_vec().unwrap();

        let result = Message::decode(MessageKind::Response, &bytes[..bytes.len() / 2]);

        assert!(matches!(result, Err(ProtocolError::CborDecode(_))));
    }
}
