//! RRC Protocol Messages
//!
//! One struct per message of 3GPP TS 36.331 section 6.2.2 exchanged over the
//! RRC SAPs. Request/response pairs correlate through `rrc_transaction_identifier`,
//! which the responding side echoes unchanged.

use crate::rrc_ies::{
    AsConfig, MeasConfig, MobilityControlInfo, RadioResourceConfigDedicated,
    ReestabUeIdentity, ReestablishmentCause,
};
use serde::{Deserialize, Serialize};

/// RRCConnectionRequest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrcConnectionRequest {
    /// S-TMSI or random value
    pub ue_identity: u64,
}

/// RRCConnectionSetup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrcConnectionSetup {
    pub rrc_transaction_identifier: u8,
    pub radio_resource_config_dedicated: RadioResourceConfigDedicated,
}

impl RrcConnectionSetup {
    /// Build the RRCConnectionSetupComplete answering this setup
    pub fn completed(&self) -> RrcConnectionSetupCompleted {
        RrcConnectionSetupCompleted {
            rrc_transaction_identifier: self.rrc_transaction_identifier,
        }
    }
}

/// RRCConnectionSetupComplete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrcConnectionSetupCompleted {
    pub rrc_transaction_identifier: u8,
}

/// RRCConnectionReconfiguration
///
/// Carrying `mobility_control_info` turns the reconfiguration into a handover command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrcConnectionReconfiguration {
    pub rrc_transaction_identifier: u8,
    pub meas_config: Option<MeasConfig>,
    pub mobility_control_info: Option<MobilityControlInfo>,
    pub radio_resource_config_dedicated: Option<RadioResourceConfigDedicated>,
}

impl RrcConnectionReconfiguration {
    /// Whether this reconfiguration commands a handover
    pub fn is_handover_command(&self) -> bool {
        self.mobility_control_info.is_some()
    }

    /// Build the RRCConnectionReconfigurationComplete answering this reconfiguration
    pub fn completed(&self) -> RrcConnectionReconfigurationCompleted {
        RrcConnectionReconfigurationCompleted {
            rrc_transaction_identifier: self.rrc_transaction_identifier,
        }
    }
}

/// RRCConnectionReconfigurationComplete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrcConnectionReconfigurationCompleted {
    pub rrc_transaction_identifier: u8,
}

/// RRCConnectionReestablishmentRequest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrcConnectionReestablishmentRequest {
    pub ue_identity: ReestabUeIdentity,
    pub reestablishment_cause: ReestablishmentCause,
}

/// RRCConnectionReestablishment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrcConnectionReestablishment {
    pub rrc_transaction_identifier: u8,
    pub radio_resource_config_dedicated: RadioResourceConfigDedicated,
}

impl RrcConnectionReestablishment {
    /// Build the RRCConnectionReestablishmentComplete answering this reestablishment
    pub fn complete(&self) -> RrcConnectionReestablishmentComplete {
        RrcConnectionReestablishmentComplete {
            rrc_transaction_identifier: self.rrc_transaction_identifier,
        }
    }
}

/// RRCConnectionReestablishmentComplete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrcConnectionReestablishmentComplete {
    pub rrc_transaction_identifier: u8,
}

/// RRCConnectionReestablishmentReject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RrcConnectionReestablishmentReject;

/// RRCConnectionRelease
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RrcConnectionRelease;

/// HandoverPreparationInformation, sent from the source to the target eNB
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverPreparationInfo {
    pub as_config: AsConfig,
}
