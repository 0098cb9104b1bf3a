// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Binary frame codec for the node transport.
//!
//! Frames are a 12-byte little-endian header followed by the payload:
//!
//! ```text
//! magic u32 = 0x4B525241 ("KRRA") | version u8 | msg_type u8 | reserved u16 | payload_size u32
//! ```
//!
//! A frame with the wrong magic or an unsupported version is dropped and
//! the failure surfaced to the caller.

use thiserror::Error;

/// "KRRA" as a u32; little-endian on the wire, so the raw bytes read "ARRK".
pub const MAGIC: u32 = 0x4B52_5241;
pub const PROTOCOL_VERSION: u8 = 1;
pub const HEADER_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Heartbeat = 0,
    AgentRegister = 1,
    AgentUpdate = 2,
    JobSubmit = 3,
    JobResult = 4,
    StateSync = 5,
    NodeInfo = 6,
    Error = 255,
}

impl TryFrom<u8> for MessageType {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, WireError> {
        match value {
            0 => Ok(MessageType::Heartbeat),
            1 => Ok(MessageType::AgentRegister),
            2 => Ok(MessageType::AgentUpdate),
            3 => Ok(MessageType::JobSubmit),
            4 => Ok(MessageType::JobResult),
            5 => Ok(MessageType::StateSync),
            6 => Ok(MessageType::NodeInfo),
            255 => Ok(MessageType::Error),
            other => Err(WireError::UnknownMessageType(other)),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("Frame shorter than header: {0} bytes")]
    ShortHeader(usize),

    #[error("Bad magic: {0:#010x}")]
    BadMagic(u32),

    #[error("Unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    #[error("Unknown message type: {0}")]
    UnknownMessageType(u8),

    #[error("Truncated payload: expected {expected} bytes, got {actual}")]
    TruncatedPayload { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub msg_type: MessageType,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(msg_type: MessageType, payload: Vec<u8>) -> Self {
        Self { msg_type, payload }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.payload.len());
        buf.extend_from_slice(&MAGIC.to_le_bytes());
        buf.push(PROTOCOL_VERSION);
        buf.push(self.msg_type as u8);
        buf.extend_from_slice(&0u16.to_le_bytes()); // reserved
        buf.extend_from_slice(&(self.payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.len() < HEADER_LEN {
            return Err(WireError::ShortHeader(bytes.len()));
        }

        let magic = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        if magic != MAGIC {
            return Err(WireError::BadMagic(magic));
        }

        let version = bytes[4];
        if version != PROTOCOL_VERSION {
            return Err(WireError::UnsupportedVersion(version));
        }

        let msg_type = MessageType::try_from(bytes[5])?;
        let payload_size = u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;

        let payload = &bytes[HEADER_LEN..];
        if payload.len() < payload_size {
            return Err(WireError::TruncatedPayload {
                expected: payload_size,
                actual: payload.len(),
            });
        }

        Ok(Self {
            msg_type,
            payload: payload[..payload_size].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_spells_krra() {
        assert_eq!(&MAGIC.to_le_bytes(), b"ARRK");
        assert_eq!(MAGIC, u32::from_le_bytes(*b"ARRK"));
    }

    #[test]
    fn test_encode_header_layout() {
        let frame = Frame::new(MessageType::JobSubmit, b"payload".to_vec());
        let bytes = frame.encode();

        assert_eq!(bytes.len(), HEADER_LEN + 7);
        assert_eq!(u32::from_le_bytes(bytes[0..4].try_into().unwrap()), MAGIC);
        assert_eq!(bytes[4], PROTOCOL_VERSION);
        assert_eq!(bytes[5], 3);
        assert_eq!(&bytes[6..8], &[0, 0]);
        assert_eq!(u32::from_le_bytes(bytes[8..12].try_into().unwrap()), 7);
        assert_eq!(&bytes[12..], b"payload");
    }

    #[test]
    fn test_decode_round_trip() {
        for (msg_type, payload) in [
            (MessageType::Heartbeat, vec![]),
            (MessageType::JobResult, b"result".to_vec()),
            (MessageType::Error, vec![0xff; 64]),
        ] {
            let frame = Frame::new(msg_type, payload);
            assert_eq!(Frame::decode(&frame.encode()).unwrap(), frame);
        }
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let mut bytes = Frame::new(MessageType::Heartbeat, vec![]).encode();
        bytes[0] = b'X';
        assert!(matches!(Frame::decode(&bytes), Err(WireError::BadMagic(_))));
    }

    #[test]
    fn test_unsupported_version_is_rejected() {
        let mut bytes = Frame::new(MessageType::Heartbeat, vec![]).encode();
        bytes[4] = 2;
        assert_eq!(Frame::decode(&bytes), Err(WireError::UnsupportedVersion(2)));
    }

    #[test]
    fn test_unknown_message_type_is_rejected() {
        let mut bytes = Frame::new(MessageType::Heartbeat, vec![]).encode();
        bytes[5] = 42;
        assert_eq!(Frame::decode(&bytes), Err(WireError::UnknownMessageType(42)));
    }

    #[test]
    fn test_short_header() {
        assert_eq!(Frame::decode(&[0u8; 5]), Err(WireError::ShortHeader(5)));
    }

    #[test]
    fn test_truncated_payload() {
        let mut bytes = Frame::new(MessageType::StateSync, b"abcdef".to_vec()).encode();
        bytes.truncate(HEADER_LEN + 3);
        assert_eq!(
            Frame::decode(&bytes),
            Err(WireError::TruncatedPayload {
                expected: 6,
                actual: 3
            })
        );
    }

    #[test]
    fn test_extra_trailing_bytes_are_ignored() {
        let mut bytes = Frame::new(MessageType::NodeInfo, b"ab".to_vec()).encode();
        bytes.extend_from_slice(b"garbage");
        let frame = Frame::decode(&bytes).unwrap();
        assert_eq!(frame.payload, b"ab");
    }
}
