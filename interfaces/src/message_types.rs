//! Message Types for UE-eNB RRC Communication
//!
//! Tags identifying each catalog message, used for logging and as the
//! message type octet of encoded frames.

use crate::rrc_ies::{MasterInformationBlock, SystemInformation, SystemInformationBlockType1};
use crate::rrc_messages::*;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use std::fmt;

/// RRC message types exchanged between UE and eNB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum MessageType {
    /// Master information block
    MasterInformationBlock = 0x01,
    /// System information block type 1
    SystemInformationBlockType1 = 0x02,
    /// System information
    SystemInformation = 0x03,
    /// RRC connection request
    RrcConnectionRequest = 0x10,
    /// RRC connection setup
    RrcConnectionSetup = 0x11,
    /// RRC connection setup complete
    RrcConnectionSetupCompleted = 0x12,
    /// RRC connection reconfiguration
    RrcConnectionReconfiguration = 0x20,
    /// RRC connection reconfiguration complete
    RrcConnectionReconfigurationCompleted = 0x21,
    /// RRC connection reestablishment request
    RrcConnectionReestablishmentRequest = 0x30,
    /// RRC connection reestablishment
    RrcConnectionReestablishment = 0x31,
    /// RRC connection reestablishment complete
    RrcConnectionReestablishmentComplete = 0x32,
    /// RRC connection reestablishment reject
    RrcConnectionReestablishmentReject = 0x33,
    /// RRC connection release
    RrcConnectionRelease = 0x40,
    /// Handover preparation information (inter-node)
    HandoverPreparationInfo = 0x50,
}

impl MessageType {
    /// Tag octet for this message type
    pub fn tag(&self) -> u8 {
        self.to_u8().unwrap_or_default()
    }

    /// Look up a message type from its tag octet
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::from_u8(tag)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A catalog message with a fixed message type
pub trait RrcMessage {
    const MESSAGE_TYPE: MessageType;
}

macro_rules! impl_rrc_message {
    ($($msg:ident),* $(,)?) => {
        $(
            impl RrcMessage for $msg {
                const MESSAGE_TYPE: MessageType = MessageType::$msg;
            }
        )*
    };
}

impl_rrc_message!(
    MasterInformationBlock,
    SystemInformationBlockType1,
    SystemInformation,
    RrcConnectionRequest,
    RrcConnectionSetup,
    RrcConnectionSetupCompleted,
    RrcConnectionReconfiguration,
    RrcConnectionReconfigurationCompleted,
    RrcConnectionReestablishmentRequest,
    RrcConnectionReestablishment,
    RrcConnectionReestablishmentComplete,
    RrcConnectionReestablishmentReject,
    RrcConnectionRelease,
    HandoverPreparationInfo,
);

/// Message type of a value, for logging
pub fn message_type_of<M: RrcMessage>(_msg: &M) -> MessageType {
    M::MESSAGE_TYPE
}
