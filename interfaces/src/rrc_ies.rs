//! RRC Information Elements
//!
//! Information elements of 3GPP TS 36.331 used by the RRC SAP messages. Field
//! names follow 36.331 with the hyphens removed. Optional fields are `Option`,
//! and CHOICE types are enums.

use common::types::{Bandwidth, Pci, Rnti};
use serde::{Deserialize, Serialize};

/// PLMN identity (24-bit packed MCC/MNC, see `common::PlmnId::to_identity`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlmnIdentityInfo {
    pub plmn_identity: u32,
}

/// Cell access related information carried by SIB1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellAccessRelatedInfo {
    pub plmn_identity_info: PlmnIdentityInfo,
    /// 28-bit E-UTRAN cell identity
    pub cell_identity: u32,
    /// Closed subscriber group indication
    pub csg_indication: bool,
    pub csg_identity: u32,
}

/// Uplink carrier information broadcast in SIB2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreqInfo {
    /// Uplink EARFCN
    pub ul_carrier_freq: u16,
    pub ul_bandwidth: Bandwidth,
}

/// RLC-Config CHOICE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RlcConfig {
    Am,
    UmBiDirectional,
    UmUniDirectionalUl,
    UmUniDirectionalDl,
}

/// LogicalChannelConfig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalChannelConfig {
    pub priority: u8,
    pub prioritized_bit_rate_kbps: u16,
    pub bucket_size_duration_ms: u16,
    pub logical_channel_group: u8,
}

/// SoundingRS-UL-ConfigCommon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundingRsUlConfigCommon {
    Reset,
    Setup {
        srs_bandwidth_config: u8,
        srs_subframe_config: u8,
    },
}

/// SoundingRS-UL-ConfigDedicated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundingRsUlConfigDedicated {
    Reset,
    Setup {
        srs_bandwidth: u8,
        srs_config_index: u16,
    },
}

/// AntennaInfoDedicated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntennaInfoDedicated {
    pub transmission_mode: u8,
}

/// PhysicalConfigDedicated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhysicalConfigDedicated {
    pub sounding_rs_ul_config_dedicated: Option<SoundingRsUlConfigDedicated>,
    pub antenna_info: Option<AntennaInfoDedicated>,
}

/// SRB-ToAddMod
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrbToAddMod {
    pub srb_identity: u8,
    pub logical_channel_config: LogicalChannelConfig,
}

/// DRB-ToAddMod
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrbToAddMod {
    pub eps_bearer_identity: u8,
    pub drb_identity: u8,
    pub rlc_config: RlcConfig,
    pub logical_channel_identity: u8,
    pub logical_channel_config: LogicalChannelConfig,
}

/// PreambleInfo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreambleInfo {
    pub number_of_ra_preambles: u8,
}

/// RA-SupervisionInfo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaSupervisionInfo {
    pub preamble_trans_max: u8,
    pub ra_response_window_size: u8,
}

/// RACH-ConfigCommon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RachConfigCommon {
    pub preamble_info: PreambleInfo,
    pub ra_supervision_info: RaSupervisionInfo,
}

/// RadioResourceConfigCommon, signalled to a single UE (e.g. in MobilityControlInfo)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioResourceConfigCommon {
    pub rach_config_common: RachConfigCommon,
}

/// RadioResourceConfigCommonSIB, broadcast in SIB2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioResourceConfigCommonSib {
    pub rach_config_common: RachConfigCommon,
}

/// RadioResourceConfigDedicated
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RadioResourceConfigDedicated {
    pub srb_to_add_mod_list: Vec<SrbToAddMod>,
    pub drb_to_add_mod_list: Vec<DrbToAddMod>,
    pub drb_to_release_list: Vec<u8>,
    pub physical_config_dedicated: Option<PhysicalConfigDedicated>,
}

impl RadioResourceConfigDedicated {
    /// Compare with `other` treating the bearer lists as sets.
    ///
    /// 36.331 gives no meaning to the order of the add/mod and release lists,
    /// so two configurations listing the same bearers in a different order
    /// configure the UE identically.
    pub fn same_bearers(&self, other: &Self) -> bool {
        let mut srbs = self.srb_to_add_mod_list.clone();
        let mut other_srbs = other.srb_to_add_mod_list.clone();
        srbs.sort_by_key(|s| s.srb_identity);
        other_srbs.sort_by_key(|s| s.srb_identity);

        let mut drbs = self.drb_to_add_mod_list.clone();
        let mut other_drbs = other.drb_to_add_mod_list.clone();
        drbs.sort_by_key(|d| d.drb_identity);
        other_drbs.sort_by_key(|d| d.drb_identity);

        let mut released = self.drb_to_release_list.clone();
        let mut other_released = other.drb_to_release_list.clone();
        released.sort_unstable();
        other_released.sort_unstable();

        srbs == other_srbs
            && drbs == other_drbs
            && released == other_released
            && self.physical_config_dedicated == other.physical_config_dedicated
    }
}

/// MeasConfig
///
/// Measurement configuration carries no fields at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MeasConfig;

/// CarrierFreqEUTRA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierFreqEutra {
    pub dl_carrier_freq: u16,
    pub ul_carrier_freq: u16,
}

/// CarrierBandwidthEUTRA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierBandwidthEutra {
    pub dl_bandwidth: Bandwidth,
    pub ul_bandwidth: Bandwidth,
}

/// RACH-ConfigDedicated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RachConfigDedicated {
    pub ra_preamble_index: u8,
    pub ra_prach_mask_index: u8,
}

/// MobilityControlInfo, the payload of a handover command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobilityControlInfo {
    pub target_phys_cell_id: Pci,
    pub carrier_freq: Option<CarrierFreqEutra>,
    pub carrier_bandwidth: Option<CarrierBandwidthEutra>,
    /// C-RNTI assigned by the target cell
    pub new_ue_identity: Rnti,
    pub radio_resource_config_common: RadioResourceConfigCommon,
    pub rach_config_dedicated: Option<RachConfigDedicated>,
}

/// ReestabUE-Identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReestabUeIdentity {
    pub c_rnti: Rnti,
    pub phys_cell_id: Pci,
}

/// ReestablishmentCause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReestablishmentCause {
    ReconfigurationFailure,
    HandoverFailure,
    OtherFailure,
}

/// MasterInformationBlock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterInformationBlock {
    pub dl_bandwidth: Bandwidth,
    /// 8 most significant bits of the SFN
    pub system_frame_number: u8,
}

/// SystemInformationBlockType1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SystemInformationBlockType1 {
    pub cell_access_related_info: CellAccessRelatedInfo,
}

/// SystemInformationBlockType2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInformationBlockType2 {
    pub radio_resource_config_common: RadioResourceConfigCommonSib,
    pub freq_info: FreqInfo,
}

/// SystemInformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SystemInformation {
    pub sib2: Option<SystemInformationBlockType2>,
}

/// AS-Config: the source cell's view of the UE configuration, transferred at handover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsConfig {
    pub source_meas_config: MeasConfig,
    pub source_radio_resource_config: RadioResourceConfigDedicated,
    pub source_ue_identity: Rnti,
    pub source_master_information_block: MasterInformationBlock,
    pub source_system_information_block_type1: SystemInformationBlockType1,
    pub source_dl_carrier_freq: u16,
}
