//! SAP Forwarders
//!
//! Binds an owning controller to an RRC SAP. Each `Member*` type implements one
//! SAP trait by forwarding every operation, arguments and result unchanged, to
//! the owner's `do_*` handler. This lets a single controller type serve several
//! SAP roles whose operation names would otherwise clash.
//!
//! The forwarder holds a `Weak` reference so that an owner can keep its own
//! forwarders (`Arc::new_cyclic`) without a reference cycle. Once the owner is
//! dropped, fallible operations return `SapError::OwnerGone` and deliveries are
//! discarded with a warning.

use super::enb_sap::{
    CompleteSetupUeParameters, EnbRrcSapProvider, EnbRrcSapUser, SetupUeParameters,
};
use super::ue_sap::{SetupParameters, UeRrcSapProvider, UeRrcSapUser};
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
use std::sync::{Arc, Weak};
use tracing::warn;

/// Handlers of a controller serving as `UeRrcSapUser`
pub trait UeRrcSapUserOwner: Send + Sync {
    fn do_setup(&self, params: SetupParameters) -> Result<(), SapError>;
    fn do_reestablish(&self) -> Result<(), SapError>;
    fn do_send_rrc_connection_request(&self, msg: RrcConnectionRequest) -> Result<(), SapError>;
    fn do_send_rrc_connection_setup_completed(
        &self,
        msg: RrcConnectionSetupCompleted,
    ) -> Result<(), SapError>;
    fn do_send_rrc_connection_reconfiguration_completed(
        &self,
        msg: RrcConnectionReconfigurationCompleted,
    ) -> Result<(), SapError>;
    fn do_send_rrc_connection_reestablishment_request(
        &self,
        msg: RrcConnectionReestablishmentRequest,
    ) -> Result<(), SapError>;
    fn do_send_rrc_connection_reestablishment_complete(
        &self,
        msg: RrcConnectionReestablishmentComplete,
    ) -> Result<(), SapError>;
}

/// Handlers of a controller serving as `UeRrcSapProvider`
pub trait UeRrcSapProviderOwner: Send + Sync {
    fn do_recv_master_information_block(&self, msg: MasterInformationBlock);
    fn do_recv_system_information_block_type1(&self, msg: SystemInformationBlockType1);
    fn do_recv_system_information(&self, msg: SystemInformation);
    fn do_recv_rrc_connection_setup(&self, msg: RrcConnectionSetup);
    fn do_recv_rrc_connection_reconfiguration(&self, msg: RrcConnectionReconfiguration);
    fn do_recv_rrc_connection_reestablishment(&self, msg: RrcConnectionReestablishment);
    fn do_recv_rrc_connection_reestablishment_reject(&self, msg: RrcConnectionReestablishmentReject);
    fn do_recv_rrc_connection_release(&self, msg: RrcConnectionRelease);
}

/// Handlers of a controller serving as `EnbRrcSapUser`
pub trait EnbRrcSapUserOwner: Send + Sync {
    fn do_setup_ue(&self, rnti: Rnti, params: SetupUeParameters) -> Result<(), SapError>;
    fn do_remove_ue(&self, rnti: Rnti) -> Result<(), SapError>;
    fn do_send_master_information_block(&self, msg: MasterInformationBlock) -> Result<(), SapError>;
    fn do_send_system_information_block_type1(
        &self,
        msg: SystemInformationBlockType1,
    ) -> Result<(), SapError>;
    fn do_send_system_information(&self, msg: SystemInformation) -> Result<(), SapError>;
    fn do_send_rrc_connection_setup(&self, rnti: Rnti, msg: RrcConnectionSetup)
        -> Result<(), SapError>;
    fn do_send_rrc_connection_reconfiguration(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReconfiguration,
    ) -> Result<(), SapError>;
    fn do_send_rrc_connection_reestablishment(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReestablishment,
    ) -> Result<(), SapError>;
    fn do_send_rrc_connection_reestablishment_reject(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReestablishmentReject,
    ) -> Result<(), SapError>;
    fn do_send_rrc_connection_release(&self, rnti: Rnti, msg: RrcConnectionRelease)
        -> Result<(), SapError>;
    fn do_encode_handover_preparation_information(
        &self,
        msg: HandoverPreparationInfo,
    ) -> Result<Bytes, SapError>;
    fn do_decode_handover_preparation_information(
        &self,
        data: Bytes,
    ) -> Result<HandoverPreparationInfo, SapError>;
    fn do_encode_handover_command(&self, msg: RrcConnectionReconfiguration)
        -> Result<Bytes, SapError>;
    fn do_decode_handover_command(&self, data: Bytes)
        -> Result<RrcConnectionReconfiguration, SapError>;
}

/// Handlers of a controller serving as `EnbRrcSapProvider`
pub trait EnbRrcSapProviderOwner: Send + Sync {
    fn do_complete_setup_ue(&self, rnti: Rnti, params: CompleteSetupUeParameters);
    fn do_recv_rrc_connection_request(&self, rnti: Rnti, msg: RrcConnectionRequest);
    fn do_recv_rrc_connection_setup_completed(&self, rnti: Rnti, msg: RrcConnectionSetupCompleted);
    fn do_recv_rrc_connection_reconfiguration_completed(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReconfigurationCompleted,
    );
    fn do_recv_rrc_connection_reestablishment_request(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReestablishmentRequest,
    );
    fn do_recv_rrc_connection_reestablishment_complete(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReestablishmentComplete,
    );
}

/// Weak owner handle shared by all forwarders
struct Owner<C> {
    owner: Weak<C>,
    sap: &'static str,
}

impl<C> Owner<C> {
    fn new(owner: Weak<C>, sap: &'static str) -> Self {
        Self { owner, sap }
    }

    fn get(&self) -> Result<Arc<C>, SapError> {
        self.owner.upgrade().ok_or(SapError::OwnerGone)
    }

    fn deliver(&self, operation: &str, f: impl FnOnce(&C)) {
        match self.owner.upgrade() {
            Some(owner) => f(&owner),
            None => warn!("{}: owner dropped, discarding {}", self.sap, operation),
        }
    }
}

/// `UeRrcSapUser` forwarding to a `UeRrcSapUserOwner`
pub struct MemberUeRrcSapUser<C> {
    owner: Owner<C>,
}

impl<C: UeRrcSapUserOwner> MemberUeRrcSapUser<C> {
    /// Create a forwarder bound to `owner`
    pub fn new(owner: &Arc<C>) -> Self {
        Self::from_weak(Arc::downgrade(owner))
    }

    /// Create a forwarder from a weak owner, e.g. inside `Arc::new_cyclic`
    pub fn from_weak(owner: Weak<C>) -> Self {
        Self { owner: Owner::new(owner, "UeRrcSapUser") }
    }
}

impl<C: UeRrcSapUserOwner> UeRrcSapUser for MemberUeRrcSapUser<C> {
    fn setup(&self, params: SetupParameters) -> Result<(), SapError> {
        self.owner.get()?.do_setup(params)
    }

    fn reestablish(&self) -> Result<(), SapError> {
        self.owner.get()?.do_reestablish()
    }

    fn send_rrc_connection_request(&self, msg: RrcConnectionRequest) -> Result<(), SapError> {
        self.owner.get()?.do_send_rrc_connection_request(msg)
    }

    fn send_rrc_connection_setup_completed(
        &self,
        msg: RrcConnectionSetupCompleted,
    ) -> Result<(), SapError> {
        self.owner.get()?.do_send_rrc_connection_setup_completed(msg)
    }

    fn send_rrc_connection_reconfiguration_completed(
        &self,
        msg: RrcConnectionReconfigurationCompleted,
    ) -> Result<(), SapError> {
        self.owner.get()?.do_send_rrc_connection_reconfiguration_completed(msg)
    }

    fn send_rrc_connection_reestablishment_request(
        &self,
        msg: RrcConnectionReestablishmentRequest,
    ) -> Result<(), SapError> {
        self.owner.get()?.do_send_rrc_connection_reestablishment_request(msg)
    }

    fn send_rrc_connection_reestablishment_complete(
        &self,
        msg: RrcConnectionReestablishmentComplete,
    ) -> Result<(), SapError> {
        self.owner.get()?.do_send_rrc_connection_reestablishment_complete(msg)
    }
}

/// `UeRrcSapProvider` forwarding to a `UeRrcSapProviderOwner`
pub struct MemberUeRrcSapProvider<C> {
    owner: Owner<C>,
}

impl<C: UeRrcSapProviderOwner> MemberUeRrcSapProvider<C> {
    /// Create a forwarder bound to `owner`
    pub fn new(owner: &Arc<C>) -> Self {
        Self::from_weak(Arc::downgrade(owner))
    }

    /// Create a forwarder from a weak owner, e.g. inside `Arc::new_cyclic`
    pub fn from_weak(owner: Weak<C>) -> Self {
        Self { owner: Owner::new(owner, "UeRrcSapProvider") }
    }
}

impl<C: UeRrcSapProviderOwner> UeRrcSapProvider for MemberUeRrcSapProvider<C> {
    fn recv_master_information_block(&self, msg: MasterInformationBlock) {
        self.owner.deliver("MasterInformationBlock", |o| o.do_recv_master_information_block(msg))
    }

    fn recv_system_information_block_type1(&self, msg: SystemInformationBlockType1) {
        self.owner
            .deliver("SystemInformationBlockType1", |o| o.do_recv_system_information_block_type1(msg))
    }

    fn recv_system_information(&self, msg: SystemInformation) {
        self.owner.deliver("SystemInformation", |o| o.do_recv_system_information(msg))
    }

    fn recv_rrc_connection_setup(&self, msg: RrcConnectionSetup) {
        self.owner.deliver("RrcConnectionSetup", |o| o.do_recv_rrc_connection_setup(msg))
    }

    fn recv_rrc_connection_reconfiguration(&self, msg: RrcConnectionReconfiguration) {
        self.owner
            .deliver("RrcConnectionReconfiguration", |o| o.do_recv_rrc_connection_reconfiguration(msg))
    }

    fn recv_rrc_connection_reestablishment(&self, msg: RrcConnectionReestablishment) {
        self.owner
            .deliver("RrcConnectionReestablishment", |o| o.do_recv_rrc_connection_reestablishment(msg))
    }

    fn recv_rrc_connection_reestablishment_reject(&self, msg: RrcConnectionReestablishmentReject) {
        self.owner.deliver("RrcConnectionReestablishmentReject", |o| {
            o.do_recv_rrc_connection_reestablishment_reject(msg)
        })
    }

    fn recv_rrc_connection_release(&self, msg: RrcConnectionRelease) {
        self.owner.deliver("RrcConnectionRelease", |o| o.do_recv_rrc_connection_release(msg))
    }
}

/// `EnbRrcSapUser` forwarding to an `EnbRrcSapUserOwner`
pub struct MemberEnbRrcSapUser<C> {
    owner: Owner<C>,
}

impl<C: EnbRrcSapUserOwner> MemberEnbRrcSapUser<C> {
    /// Create a forwarder bound to `owner`
    pub fn new(owner: &Arc<C>) -> Self {
        Self::from_weak(Arc::downgrade(owner))
    }

    /// Create a forwarder from a weak owner, e.g. inside `Arc::new_cyclic`
    pub fn from_weak(owner: Weak<C>) -> Self {
        Self { owner: Owner::new(owner, "EnbRrcSapUser") }
    }
}

impl<C: EnbRrcSapUserOwner> EnbRrcSapUser for MemberEnbRrcSapUser<C> {
    fn setup_ue(&self, rnti: Rnti, params: SetupUeParameters) -> Result<(), SapError> {
        self.owner.get()?.do_setup_ue(rnti, params)
    }

    fn remove_ue(&self, rnti: Rnti) -> Result<(), SapError> {
        self.owner.get()?.do_remove_ue(rnti)
    }

    fn send_master_information_block(&self, msg: MasterInformationBlock) -> Result<(), SapError> {
        self.owner.get()?.do_send_master_information_block(msg)
    }

    fn send_system_information_block_type1(
        &self,
        msg: SystemInformationBlockType1,
    ) -> Result<(), SapError> {
        self.owner.get()?.do_send_system_information_block_type1(msg)
    }

    fn send_system_information(&self, msg: SystemInformation) -> Result<(), SapError> {
        self.owner.get()?.do_send_system_information(msg)
    }

    fn send_rrc_connection_setup(&self, rnti: Rnti, msg: RrcConnectionSetup)
        -> Result<(), SapError> {
        self.owner.get()?.do_send_rrc_connection_setup(rnti, msg)
    }

    fn send_rrc_connection_reconfiguration(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReconfiguration,
    ) -> Result<(), SapError> {
        self.owner.get()?.do_send_rrc_connection_reconfiguration(rnti, msg)
    }

    fn send_rrc_connection_reestablishment(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReestablishment,
    ) -> Result<(), SapError> {
        self.owner.get()?.do_send_rrc_connection_reestablishment(rnti, msg)
    }

    fn send_rrc_connection_reestablishment_reject(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReestablishmentReject,
    ) -> Result<(), SapError> {
        self.owner.get()?.do_send_rrc_connection_reestablishment_reject(rnti, msg)
    }

    fn send_rrc_connection_release(
        &self,
        rnti: Rnti,
        msg: RrcConnectionRelease,
    ) -> Result<(), SapError> {
        self.owner.get()?.do_send_rrc_connection_release(rnti, msg)
    }

    fn encode_handover_preparation_information(
        &self,
        msg: HandoverPreparationInfo,
    ) -> Result<Bytes, SapError> {
        self.owner.get()?.do_encode_handover_preparation_information(msg)
    }

    fn decode_handover_preparation_information(
        &self,
        data: Bytes,
    ) -> Result<HandoverPreparationInfo, SapError> {
        self.owner.get()?.do_decode_handover_preparation_information(data)
    }

    fn encode_handover_command(&self, msg: RrcConnectionReconfiguration)
        -> Result<Bytes, SapError> {
        self.owner.get()?.do_encode_handover_command(msg)
    }

    fn decode_handover_command(&self, data: Bytes)
        -> Result<RrcConnectionReconfiguration, SapError> {
        self.owner.get()?.do_decode_handover_command(data)
    }
}

/// `EnbRrcSapProvider` forwarding to an `EnbRrcSapProviderOwner`
pub struct MemberEnbRrcSapProvider<C> {
    owner: Owner<C>,
}

impl<C: EnbRrcSapProviderOwner> MemberEnbRrcSapProvider<C> {
    /// Create a forwarder bound to `owner`
    pub fn new(owner: &Arc<C>) -> Self {
        Self::from_weak(Arc::downgrade(owner))
    }

    /// Create a forwarder from a weak owner, e.g. inside `Arc::new_cyclic`
    pub fn from_weak(owner: Weak<C>) -> Self {
        Self { owner: Owner::new(owner, "EnbRrcSapProvider") }
    }
}

impl<C: EnbRrcSapProviderOwner> EnbRrcSapProvider for MemberEnbRrcSapProvider<C> {
    fn complete_setup_ue(&self, rnti: Rnti, params: CompleteSetupUeParameters) {
        self.owner.deliver("CompleteSetupUe", |o| o.do_complete_setup_ue(rnti, params))
    }

    fn recv_rrc_connection_request(&self, rnti: Rnti, msg: RrcConnectionRequest) {
        self.owner
            .deliver("RrcConnectionRequest", |o| o.do_recv_rrc_connection_request(rnti, msg))
    }

    fn recv_rrc_connection_setup_completed(&self, rnti: Rnti, msg: RrcConnectionSetupCompleted) {
        self.owner.deliver("RrcConnectionSetupCompleted", |o| {
            o.do_recv_rrc_connection_setup_completed(rnti, msg)
        })
    }

    fn recv_rrc_connection_reconfiguration_completed(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReconfigurationCompleted,
    ) {
        self.owner.deliver("RrcConnectionReconfigurationCompleted", |o| {
            o.do_recv_rrc_connection_reconfiguration_completed(rnti, msg)
        })
    }

    fn recv_rrc_connection_reestablishment_request(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReestablishmentRequest,
    ) {
        self.owner.deliver("RrcConnectionReestablishmentRequest", |o| {
            o.do_recv_rrc_connection_reestablishment_request(rnti, msg)
        })
    }

    fn recv_rrc_connection_reestablishment_complete(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReestablishmentComplete,
    ) {
        self.owner.deliver("RrcConnectionReestablishmentComplete", |o| {
            o.do_recv_rrc_connection_reestablishment_complete(rnti, msg)
        })
    }
}
