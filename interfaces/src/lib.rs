//! RRC Message Catalog and Wire Interfaces Library
//!
//! This crate provides the LTE RRC information elements and protocol messages
//! (3GPP TS 36.331) exchanged between the UE and eNB RRC entities, and the codec
//! for the two payloads that must cross a node boundary as bytes.

pub mod codec;
pub mod message_types;
pub mod rrc_ies;
pub mod rrc_messages;

pub use codec::{CodecConfig, HandoverCodec};
pub use message_types::{MessageType, RrcMessage};
pub use rrc_ies::*;
pub use rrc_messages::*;

use thiserror::Error;

/// Interface errors
#[derive(Error, Debug)]
pub enum InterfaceError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Truncated frame: {len} bytes, need at least {min}")]
    Truncated { len: usize, min: usize },

    #[error("Invalid protocol discriminator {0:#04x}")]
    InvalidDiscriminator(u8),

    #[error("Unsupported frame version {0}")]
    UnsupportedVersion(u8),

    #[error("Unexpected message type: expected {expected:?}, found tag {found:#04x}")]
    UnexpectedMessageType { expected: MessageType, found: u8 },

    #[error("Length mismatch: header declares {declared} payload bytes, frame carries {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("Payload of {len} bytes exceeds limit of {limit}")]
    PayloadTooLarge { len: u64, limit: u64 },

    #[error("Checksum mismatch: expected {expected:#06x}, computed {computed:#06x}")]
    ChecksumMismatch { expected: u16, computed: u16 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
