//! eNB-side RRC SAPs
//!
//! Mirrors the UE-side pair, with every per-UE operation keyed by the C-RNTI
//! since one eNB RRC serves many UEs. The eNB user SAP also carries the four
//! transcoding operations for the payloads that cross the X2/S1 boundary.

use crate::pdcp::{PdcpSapProvider, PdcpSapUser};
use crate::rlc::{RlcSapProvider, RlcSapUser};
use crate::SapError;
use bytes::Bytes;
use common::types::Rnti;
use interfaces::{
    HandoverPreparationInfo, MasterInformationBlock, RrcConnectionReconfiguration,
    RrcConnectionReconfigurationCompleted, RrcConnectionReestablishment,
    RrcConnectionReestablishmentComplete, RrcConnectionReestablishmentReject,
    RrcConnectionReestablishmentRequest, RrcConnectionRelease, RrcConnectionRequest,
    RrcConnectionSetup, RrcConnectionSetupCompleted, SystemInformation,
    SystemInformationBlockType1,
};
use std::fmt;
use std::sync::Arc;

/// eNB-side SRB handles bound by `EnbRrcSapUser::setup_ue`
#[derive(Clone)]
pub struct SetupUeParameters {
    /// RLC entity carrying SRB0 for this UE
    pub srb0_sap_provider: Arc<dyn RlcSapProvider>,
    /// PDCP entity carrying SRB1 for this UE
    pub srb1_sap_provider: Arc<dyn PdcpSapProvider>,
}

impl fmt::Debug for SetupUeParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetupUeParameters").finish_non_exhaustive()
    }
}

/// Receive-side SRB handles returned to the eNB RRC by `EnbRrcSapProvider::complete_setup_ue`
#[derive(Clone)]
pub struct CompleteSetupUeParameters {
    pub srb0_sap_user: Arc<dyn RlcSapUser>,
    pub srb1_sap_user: Arc<dyn PdcpSapUser>,
}

impl fmt::Debug for CompleteSetupUeParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompleteSetupUeParameters").finish_non_exhaustive()
    }
}

/// SAP used by the eNB RRC to send messages to UEs
pub trait EnbRrcSapUser: Send + Sync {
    /// Open a session for `rnti` with its SRB handles
    fn setup_ue(&self, rnti: Rnti, params: SetupUeParameters) -> Result<(), SapError>;

    /// Close the session for `rnti`
    fn remove_ue(&self, rnti: Rnti) -> Result<(), SapError>;

    /// Broadcast the MIB
    fn send_master_information_block(&self, msg: MasterInformationBlock) -> Result<(), SapError>;

    /// Broadcast SIB1
    fn send_system_information_block_type1(
        &self,
        msg: SystemInformationBlockType1,
    ) -> Result<(), SapError>;

    /// Broadcast a SystemInformation message
    fn send_system_information(&self, msg: SystemInformation) -> Result<(), SapError>;

    fn send_rrc_connection_setup(&self, rnti: Rnti, msg: RrcConnectionSetup)
        -> Result<(), SapError>;

    fn send_rrc_connection_reconfiguration(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReconfiguration,
    ) -> Result<(), SapError>;

    fn send_rrc_connection_reestablishment(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReestablishment,
    ) -> Result<(), SapError>;

    fn send_rrc_connection_reestablishment_reject(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReestablishmentReject,
    ) -> Result<(), SapError>;

    fn send_rrc_connection_release(
        &self,
        rnti: Rnti,
        msg: RrcConnectionRelease,
    ) -> Result<(), SapError>;

    /// Serialize HandoverPreparationInformation for the target eNB
    fn encode_handover_preparation_information(
        &self,
        msg: HandoverPreparationInfo,
    ) -> Result<Bytes, SapError>;

    /// Rebuild HandoverPreparationInformation received from the source eNB
    fn decode_handover_preparation_information(
        &self,
        data: Bytes,
    ) -> Result<HandoverPreparationInfo, SapError>;

    /// Serialize a handover command for the source eNB
    fn encode_handover_command(&self, msg: RrcConnectionReconfiguration)
        -> Result<Bytes, SapError>;

    /// Rebuild a handover command received from the target eNB
    fn decode_handover_command(&self, data: Bytes)
        -> Result<RrcConnectionReconfiguration, SapError>;
}

/// SAP used to let the eNB RRC receive messages from UEs
pub trait EnbRrcSapProvider: Send + Sync {
    /// Hand the receive-side SRB handles of a new session to the eNB RRC
    fn complete_setup_ue(&self, rnti: Rnti, params: CompleteSetupUeParameters);

    fn recv_rrc_connection_request(&self, rnti: Rnti, msg: RrcConnectionRequest);

    fn recv_rrc_connection_setup_completed(&self, rnti: Rnti, msg: RrcConnectionSetupCompleted);

    fn recv_rrc_connection_reconfiguration_completed(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReconfigurationCompleted,
    );

    fn recv_rrc_connection_reestablishment_request(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReestablishmentRequest,
    );

    fn recv_rrc_connection_reestablishment_complete(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReestablishmentComplete,
    );
}
