//! UE-side RRC SAPs
//!
//! `UeRrcSapUser` is what the UE RRC controller calls to send messages towards
//! the eNB; `UeRrcSapProvider` is what the peer calls to deliver messages to the
//! UE RRC controller. Each operation maps to one message of TS 36.331 section 6.2.2.

use crate::pdcp::PdcpSapProvider;
use crate::rlc::RlcSapProvider;
use crate::SapError;
use interfaces::{
    MasterInformationBlock, RrcConnectionReconfiguration, RrcConnectionReconfigurationCompleted,
    RrcConnectionReestablishment, RrcConnectionReestablishmentComplete,
    RrcConnectionReestablishmentReject, RrcConnectionReestablishmentRequest, RrcConnectionRelease,
    RrcConnectionRequest, RrcConnectionSetup, RrcConnectionSetupCompleted, SystemInformation,
    SystemInformationBlockType1,
};
use std::fmt;
use std::sync::Arc;

/// Signalling radio bearer handles bound by `UeRrcSapUser::setup`
#[derive(Clone)]
pub struct SetupParameters {
    /// RLC entity carrying SRB0
    pub srb0_sap_provider: Arc<dyn RlcSapProvider>,
    /// PDCP entity carrying SRB1
    pub srb1_sap_provider: Arc<dyn PdcpSapProvider>,
}

impl fmt::Debug for SetupParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetupParameters").finish_non_exhaustive()
    }
}

/// SAP used by the UE RRC to send messages to the eNB
pub trait UeRrcSapUser: Send + Sync {
    /// Bind the SRB transport handles, once per connection
    fn setup(&self, params: SetupParameters) -> Result<(), SapError>;

    /// Signal that the UE is about to resume the connection after a link failure
    fn reestablish(&self) -> Result<(), SapError>;

    fn send_rrc_connection_request(&self, msg: RrcConnectionRequest) -> Result<(), SapError>;

    fn send_rrc_connection_setup_completed(
        &self,
        msg: RrcConnectionSetupCompleted,
    ) -> Result<(), SapError>;

    fn send_rrc_connection_reconfiguration_completed(
        &self,
        msg: RrcConnectionReconfigurationCompleted,
    ) -> Result<(), SapError>;

    fn send_rrc_connection_reestablishment_request(
        &self,
        msg: RrcConnectionReestablishmentRequest,
    ) -> Result<(), SapError>;

    fn send_rrc_connection_reestablishment_complete(
        &self,
        msg: RrcConnectionReestablishmentComplete,
    ) -> Result<(), SapError>;
}

/// SAP used to let the UE RRC receive messages from the eNB RRC
///
/// Deliveries are not checked against the procedure state; the UE RRC decides
/// what an unexpected message means.
pub trait UeRrcSapProvider: Send + Sync {
    fn recv_master_information_block(&self, msg: MasterInformationBlock);

    fn recv_system_information_block_type1(&self, msg: SystemInformationBlockType1);

    fn recv_system_information(&self, msg: SystemInformation);

    fn recv_rrc_connection_setup(&self, msg: RrcConnectionSetup);

    fn recv_rrc_connection_reconfiguration(&self, msg: RrcConnectionReconfiguration);

    fn recv_rrc_connection_reestablishment(&self, msg: RrcConnectionReestablishment);

    fn recv_rrc_connection_reestablishment_reject(&self, msg: RrcConnectionReestablishmentReject);

    fn recv_rrc_connection_release(&self, msg: RrcConnectionRelease);
}
