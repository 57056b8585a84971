//! Message discriminants.

/// Identifies the payload type of a message.
///
/// Carried by the transport next to the CBOR bytes, never inside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MessageKind {
    /// Receiver → Sender: public keys and commitment
    Request = 0x0001,
    /// Sender → Receiver: sealed branch keys and masked messages
    Response = 0x0002,
    /// Sender → Receiver: request rejected
    Error = 0x00FF,
}

impl MessageKind {
    /// Wire value.
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Parse a wire value. Unknown values return `None`.
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0001 => Some(Self::Request),
            0x0002 => Some(Self::Response),
            0x00FF => Some(Self::Error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_round_trip() {
        for kind in [MessageKind::Request, MessageKind::Response, MessageKind::Error] {
            assert_eq!(MessageKind::from_u16(kind.to_u16()), Some(kind));
        }
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert_eq!(MessageKind::from_u16(0x0000), None);
        assert_eq!(MessageKind::from_u16(0x0003), None);
        assert_eq!(MessageKind::from_u16(0xFFFF), None);
    }
}
