//! Handover Transcoding
//!
//! HandoverPreparationInformation and the handover command (an
//! RRCConnectionReconfiguration carrying MobilityControlInfo) leave the eNB
//! as opaque byte strings: the former travels source-to-target over X2/S1,
//! the latter comes back inside the target's acknowledgement and is relayed
//! to the UE. This module fixes their byte form.
//!
//! Frame layout (big endian):
//!
//! ```text
//! +------+---------+----------+-------------+---------+--------+
//! | 0xC7 | version | msg type | payload len | payload | crc16  |
//! |  1   |    1    |    1     |      4      |    n    |   2    |
//! +------+---------+----------+-------------+---------+--------+
//! ```
//!
//! The CRC covers the header and the payload.

use crate::{
    message_types::RrcMessage,
    rrc_messages::{HandoverPreparationInfo, RrcConnectionReconfiguration},
    InterfaceError,
};
use bincode::Options;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use common::utils::{bytes_to_hex, crc16};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, trace};

/// Protocol discriminator opening every frame
pub const PROTOCOL_DISCRIMINATOR: u8 = 0xC7;
/// Current frame version
pub const FRAME_VERSION: u8 = 1;
/// Discriminator, version, message type and payload length
pub const HEADER_LEN: usize = 7;
/// Trailing CRC-16
pub const TRAILER_LEN: usize = 2;

/// Codec configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Largest payload accepted by encode and decode, in bytes
    #[serde(default = "default_max_payload_len")]
    pub max_payload_len: u64,
}

fn default_max_payload_len() -> u64 {
    64 * 1024
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_payload_len: default_max_payload_len(),
        }
    }
}

impl CodecConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), InterfaceError> {
        if self.max_payload_len == 0 {
            return Err(InterfaceError::InvalidConfig(
                "max_payload_len must be greater than zero".to_string(),
            ));
        }
        if self.max_payload_len > u32::MAX as u64 {
            return Err(InterfaceError::InvalidConfig(format!(
                "max_payload_len {} does not fit the 32-bit length field",
                self.max_payload_len
            )));
        }
        Ok(())
    }
}

/// Encoder/decoder for the inter-node handover payloads
#[derive(Debug, Clone, Default)]
pub struct HandoverCodec {
    config: CodecConfig,
}

impl HandoverCodec {
    /// Create a new codec
    pub fn new(config: CodecConfig) -> Result<Self, InterfaceError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Codec configuration
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode HandoverPreparationInformation for transfer to the target eNB
    pub fn encode_handover_preparation_info(
        &self,
        msg: &HandoverPreparationInfo,
    ) -> Result<Bytes, InterfaceError> {
        self.encode(msg)
    }

    /// Decode HandoverPreparationInformation received from the source eNB
    pub fn decode_handover_preparation_info(
        &self,
        data: &[u8],
    ) -> Result<HandoverPreparationInfo, InterfaceError> {
        self.decode(data)
    }

    /// Encode a handover command for transfer back to the source eNB
    pub fn encode_handover_command(
        &self,
        msg: &RrcConnectionReconfiguration,
    ) -> Result<Bytes, InterfaceError> {
        self.encode(msg)
    }

    /// Decode a handover command received from the target eNB
    pub fn decode_handover_command(
        &self,
        data: &[u8],
    ) -> Result<RrcConnectionReconfiguration, InterfaceError> {
        self.decode(data)
    }

    fn options(&self) -> impl Options {
        bincode::DefaultOptions::new()
            .with_limit(self.config.max_payload_len)
            .with_big_endian()
            .with_fixint_encoding()
            .reject_trailing_bytes()
    }

    fn encode<M: RrcMessage + Serialize>(&self, msg: &M) -> Result<Bytes, InterfaceError> {
        let payload = self.options().serialize(msg)?;

        let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len() + TRAILER_LEN);
        buf.put_u8(PROTOCOL_DISCRIMINATOR);
        buf.put_u8(FRAME_VERSION);
        buf.put_u8(M::MESSAGE_TYPE.tag());
        // Bounded by max_payload_len, which validate() keeps within u32
        buf.put_u32(payload.len() as u32);
        buf.put_slice(&payload);
        let crc = crc16(&buf);
        buf.put_u16(crc);

        debug!("Encoded {} into {} bytes", M::MESSAGE_TYPE, buf.len());
        trace!("{} frame: {}", M::MESSAGE_TYPE, bytes_to_hex(&buf));

        Ok(buf.freeze())
    }

    fn decode<M: RrcMessage + DeserializeOwned>(&self, data: &[u8]) -> Result<M, InterfaceError> {
        let min = HEADER_LEN + TRAILER_LEN;
        if data.len() < min {
            return Err(InterfaceError::Truncated { len: data.len(), min });
        }

        let mut header = &data[..HEADER_LEN];
        let discriminator = header.get_u8();
        if discriminator != PROTOCOL_DISCRIMINATOR {
            return Err(InterfaceError::InvalidDiscriminator(discriminator));
        }

        let version = header.get_u8();
        if version != FRAME_VERSION {
            return Err(InterfaceError::UnsupportedVersion(version));
        }

        let tag = header.get_u8();
        if tag != M::MESSAGE_TYPE.tag() {
            return Err(InterfaceError::UnexpectedMessageType {
                expected: M::MESSAGE_TYPE,
                found: tag,
            });
        }

        let declared = header.get_u32() as u64;
        if declared > self.config.max_payload_len {
            return Err(InterfaceError::PayloadTooLarge {
                len: declared,
                limit: self.config.max_payload_len,
            });
        }

        let actual = data.len() - min;
        if declared != actual as u64 {
            return Err(InterfaceError::LengthMismatch {
                declared: declared as usize,
                actual,
            });
        }

        let body_end = HEADER_LEN + actual;
        let mut trailer = &data[body_end..];
        let expected = trailer.get_u16();
        let computed = crc16(&data[..body_end]);
        if expected != computed {
            return Err(InterfaceError::ChecksumMismatch { expected, computed });
        }

        let msg = self.options().deserialize(&data[HEADER_LEN..body_end])?;
        debug!("Decoded {} from {} bytes", M::MESSAGE_TYPE, data.len());
        Ok(msg)
    }
}
