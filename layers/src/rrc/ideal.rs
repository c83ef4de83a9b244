//! Ideal RRC Protocol
//!
//! In-process transport between UE and eNB RRC controllers. Messages are handed
//! over by direct call instead of being encoded onto SRB0/SRB1, so every
//! delivery completes before the send returns and per-UE ordering is the order
//! of the sends. The SRB handles exchanged at setup are stored but never used.

use super::enb_sap::{
    CompleteSetupUeParameters, EnbRrcSapProvider, EnbRrcSapUser, SetupUeParameters,
};
use super::session::{Delivery, SessionRegistry};
use super::ue_sap::{SetupParameters, UeRrcSapProvider, UeRrcSapUser};
use crate::config::RrcSapConfig;
use crate::pdcp::{PdcpSapUser, ReceivePdcpSduParameters};
use crate::rlc::RlcSapUser;
use crate::SapError;
use bytes::Bytes;
use common::types::Rnti;
use dashmap::DashMap;
use interfaces::{
    message_types::message_type_of, HandoverCodec, HandoverPreparationInfo,
    MasterInformationBlock, RrcConnectionReconfiguration, RrcConnectionReconfigurationCompleted,
    RrcConnectionReestablishment, RrcConnectionReestablishmentComplete,
    RrcConnectionReestablishmentReject, RrcConnectionReestablishmentRequest, RrcConnectionRelease,
    RrcConnectionRequest, RrcConnectionSetup, RrcConnectionSetupCompleted, SystemInformation,
    SystemInformationBlockType1,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// SRB endpoint handed to the eNB RRC in ideal mode
///
/// Nothing is carried over SRBs when messages travel by direct call, so any PDU
/// delivered here is dropped.
pub struct IdealSrbUser {
    rnti: Rnti,
    dropped: AtomicUsize,
}

impl IdealSrbUser {
    pub fn new(rnti: Rnti) -> Self {
        Self { rnti, dropped: AtomicUsize::new(0) }
    }

    /// Number of PDUs and SDUs dropped so far
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl RlcSapUser for IdealSrbUser {
    fn receive_pdcp_pdu(&self, pdu: Bytes) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        warn!("Ideal RRC: dropping {} byte SRB0 PDU for RNTI {}", pdu.len(), self.rnti);
    }
}

impl PdcpSapUser for IdealSrbUser {
    fn receive_pdcp_sdu(&self, params: ReceivePdcpSduParameters) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        warn!(
            "Ideal RRC: dropping {} byte SRB1 SDU for RNTI {} (LCID {})",
            params.pdcp_sdu.len(),
            params.rnti,
            params.lcid
        );
    }
}

/// eNB side of the ideal RRC protocol
pub struct EnbRrcProtocolIdeal {
    sessions: SessionRegistry,
    ues: DashMap<Rnti, Arc<dyn UeRrcSapProvider>>,
    enb_rrc_sap_provider: RwLock<Option<Arc<dyn EnbRrcSapProvider>>>,
    codec: HandoverCodec,
}

impl EnbRrcProtocolIdeal {
    /// Create a protocol instance with default limits
    pub fn new() -> Self {
        Self::with_parts(SessionRegistry::default(), HandoverCodec::default())
    }

    /// Create a protocol instance from a validated configuration
    pub fn with_config(config: &RrcSapConfig) -> Result<Self, SapError> {
        config.validate()?;
        let codec = HandoverCodec::new(config.codec)?;
        info!(
            "Ideal eNB RRC protocol: max {} sessions, {} byte payload limit",
            config.max_sessions, config.codec.max_payload_len
        );
        Ok(Self::with_parts(SessionRegistry::new(config.max_sessions), codec))
    }

    fn with_parts(sessions: SessionRegistry, codec: HandoverCodec) -> Self {
        Self {
            sessions,
            ues: DashMap::new(),
            enb_rrc_sap_provider: RwLock::new(None),
            codec,
        }
    }

    /// Bind the eNB RRC controller receiving messages from UEs
    pub fn set_enb_rrc_sap_provider(&self, provider: Arc<dyn EnbRrcSapProvider>) {
        *self
            .enb_rrc_sap_provider
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(provider);
    }

    /// Attach the inbound SAP of the UE controller using `rnti`
    pub fn attach_ue(&self, rnti: Rnti, ue: Arc<dyn UeRrcSapProvider>) {
        if self.ues.insert(rnti, ue).is_some() {
            debug!("Replaced UE SAP attached to RNTI {}", rnti);
        }
        info!("UE attached to RNTI {}", rnti);
    }

    /// Detach the UE controller using `rnti`, returning whether one was attached
    pub fn detach_ue(&self, rnti: Rnti) -> bool {
        let detached = self.ues.remove(&rnti).is_some();
        if detached {
            info!("UE detached from RNTI {}", rnti);
        }
        detached
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    fn enb_provider(&self) -> Result<Arc<dyn EnbRrcSapProvider>, SapError> {
        self.enb_rrc_sap_provider
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(SapError::NotConnected)
    }

    /// UE SAP for a live session, with the delivery guard that holds off its removal
    ///
    /// Only the guard outlives this call; no map lock is held while delivering.
    fn ue_provider(&self, rnti: Rnti) -> Result<(Delivery, Arc<dyn UeRrcSapProvider>), SapError> {
        let delivery = self.sessions.enter(rnti)?;
        let ue = self
            .ues
            .get(&rnti)
            .map(|ue| ue.value().clone())
            .ok_or(SapError::UeNotAttached(rnti))?;
        Ok((delivery, ue))
    }

    fn attached_ues(&self) -> Vec<Arc<dyn UeRrcSapProvider>> {
        self.ues.iter().map(|ue| ue.value().clone()).collect()
    }
}

impl Default for EnbRrcProtocolIdeal {
    fn default() -> Self {
        Self::new()
    }
}

impl EnbRrcSapUser for EnbRrcProtocolIdeal {
    fn setup_ue(&self, rnti: Rnti, params: SetupUeParameters) -> Result<(), SapError> {
        let provider = self.enb_provider()?;
        self.sessions.setup(rnti, params)?;

        let srb_user = Arc::new(IdealSrbUser::new(rnti));
        let complete = CompleteSetupUeParameters {
            srb0_sap_user: srb_user.clone(),
            srb1_sap_user: srb_user,
        };
        self.sessions.complete(rnti, complete.clone())?;
        provider.complete_setup_ue(rnti, complete);
        Ok(())
    }

    /// Waits for in-flight sends to `rnti`; fails `SessionBusy` from inside one
    fn remove_ue(&self, rnti: Rnti) -> Result<(), SapError> {
        self.sessions.remove(rnti).map(|_| ())
    }

    fn send_master_information_block(&self, msg: MasterInformationBlock) -> Result<(), SapError> {
        let ues = self.attached_ues();
        debug!("Broadcasting {} to {} UEs", message_type_of(&msg), ues.len());
        for ue in ues {
            ue.recv_master_information_block(msg);
        }
        Ok(())
    }

    fn send_system_information_block_type1(
        &self,
        msg: SystemInformationBlockType1,
    ) -> Result<(), SapError> {
        let ues = self.attached_ues();
        debug!("Broadcasting {} to {} UEs", message_type_of(&msg), ues.len());
        for ue in ues {
            ue.recv_system_information_block_type1(msg);
        }
        Ok(())
    }

    fn send_system_information(&self, msg: SystemInformation) -> Result<(), SapError> {
        let ues = self.attached_ues();
        debug!("Broadcasting {} to {} UEs", message_type_of(&msg), ues.len());
        for ue in ues {
            ue.recv_system_information(msg);
        }
        Ok(())
    }

    fn send_rrc_connection_setup(&self, rnti: Rnti, msg: RrcConnectionSetup)
        -> Result<(), SapError> {
        let (_delivery, ue) = self.ue_provider(rnti)?;
        debug!("{} -> RNTI {}", message_type_of(&msg), rnti);
        ue.recv_rrc_connection_setup(msg);
        Ok(())
    }

    fn send_rrc_connection_reconfiguration(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReconfiguration,
    ) -> Result<(), SapError> {
        let (_delivery, ue) = self.ue_provider(rnti)?;
        debug!(
            "{} -> RNTI {} (handover: {})",
            message_type_of(&msg),
            rnti,
            msg.is_handover_command()
        );
        ue.recv_rrc_connection_reconfiguration(msg);
        Ok(())
    }

    fn send_rrc_connection_reestablishment(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReestablishment,
    ) -> Result<(), SapError> {
        let (_delivery, ue) = self.ue_provider(rnti)?;
        debug!("{} -> RNTI {}", message_type_of(&msg), rnti);
        ue.recv_rrc_connection_reestablishment(msg);
        Ok(())
    }

    fn send_rrc_connection_reestablishment_reject(
        &self,
        rnti: Rnti,
        msg: RrcConnectionReestablishmentReject,
    ) -> Result<(), SapError> {
        let (_delivery, ue) = self.ue_provider(rnti)?;
        debug!("{} -> RNTI {}", message_type_of(&msg), rnti);
        ue.recv_rrc_connection_reestablishment_reject(msg);
        Ok(())
    }

    fn send_rrc_connection_release(
        &self,
        rnti: Rnti,
        msg: RrcConnectionRelease,
    ) -> Result<(), SapError> {
        let (_delivery, ue) = self.ue_provider(rnti)?;
        debug!("{} -> RNTI {}", message_type_of(&msg), rnti);
        ue.recv_rrc_connection_release(msg);
        Ok(())
    }

    fn encode_handover_preparation_information(
        &self,
        msg: HandoverPreparationInfo,
    ) -> Result<Bytes, SapError> {
        Ok(self.codec.encode_handover_preparation_info(&msg)?)
    }

    fn decode_handover_preparation_information(
        &self,
        data: Bytes,
    ) -> Result<HandoverPreparationInfo, SapError> {
        Ok(self.codec.decode_handover_preparation_info(&data)?)
    }

    fn encode_handover_command(&self, msg: RrcConnectionReconfiguration)
        -> Result<Bytes, SapError> {
        Ok(self.codec.encode_handover_command(&msg)?)
    }

    fn decode_handover_command(&self, data: Bytes)
        -> Result<RrcConnectionReconfiguration, SapError> {
        Ok(self.codec.decode_handover_command(&data)?)
    }
}

/// UE side of the ideal RRC protocol, serving one RNTI
pub struct UeRrcProtocolIdeal {
    rnti: Rnti,
    enb_rrc_sap_provider: RwLock<Option<Arc<dyn EnbRrcSapProvider>>>,
    srbs: Mutex<Option<SetupParameters>>,
}

impl UeRrcProtocolIdeal {
    pub fn new(rnti: Rnti) -> Self {
        Self {
            rnti,
            enb_rrc_sap_provider: RwLock::new(None),
            srbs: Mutex::new(None),
        }
    }

    pub fn rnti(&self) -> Rnti {
        self.rnti
    }

    /// Bind the serving eNB's inbound SAP
    pub fn connect(&self, enb: Arc<dyn EnbRrcSapProvider>) {
        *self
            .enb_rrc_sap_provider
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(enb);
        info!("UE RNTI {} connected to eNB", self.rnti);
    }

    /// Whether SRB handles are bound for the current connection
    pub fn is_setup(&self) -> bool {
        self.srbs.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    fn enb(&self) -> Result<Arc<dyn EnbRrcSapProvider>, SapError> {
        self.enb_rrc_sap_provider
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(SapError::NotConnected)
    }
}

impl UeRrcSapUser for UeRrcProtocolIdeal {
    fn setup(&self, params: SetupParameters) -> Result<(), SapError> {
        let mut srbs = self.srbs.lock().unwrap_or_else(PoisonError::into_inner);
        if srbs.is_some() {
            return Err(SapError::AlreadySetup);
        }
        *srbs = Some(params);
        debug!("UE RNTI {}: SRBs bound", self.rnti);
        Ok(())
    }

    fn reestablish(&self) -> Result<(), SapError> {
        self.srbs.lock().unwrap_or_else(PoisonError::into_inner).take();
        info!("UE RNTI {}: reestablishing", self.rnti);
        Ok(())
    }

    fn send_rrc_connection_request(&self, msg: RrcConnectionRequest) -> Result<(), SapError> {
        let enb = self.enb()?;
        debug!("RNTI {} -> {} (UE identity {:#x})", self.rnti, message_type_of(&msg), msg.ue_identity);
        enb.recv_rrc_connection_request(self.rnti, msg);
        Ok(())
    }

    fn send_rrc_connection_setup_completed(
        &self,
        msg: RrcConnectionSetupCompleted,
    ) -> Result<(), SapError> {
        let enb = self.enb()?;
        debug!("RNTI {} -> {}", self.rnti, message_type_of(&msg));
        enb.recv_rrc_connection_setup_completed(self.rnti, msg);
        Ok(())
    }

    fn send_rrc_connection_reconfiguration_completed(
        &self,
        msg: RrcConnectionReconfigurationCompleted,
    ) -> Result<(), SapError> {
        let enb = self.enb()?;
        debug!("RNTI {} -> {}", self.rnti, message_type_of(&msg));
        enb.recv_rrc_connection_reconfiguration_completed(self.rnti, msg);
        Ok(())
    }

    fn send_rrc_connection_reestablishment_request(
        &self,
        msg: RrcConnectionReestablishmentRequest,
    ) -> Result<(), SapError> {
        let enb = self.enb()?;
        debug!("RNTI {} -> {} ({:?})", self.rnti, message_type_of(&msg), msg.reestablishment_cause);
        enb.recv_rrc_connection_reestablishment_request(self.rnti, msg);
        Ok(())
    }

    fn send_rrc_connection_reestablishment_complete(
        &self,
        msg: RrcConnectionReestablishmentComplete,
    ) -> Result<(), SapError> {
        let enb = self.enb()?;
        debug!("RNTI {} -> {}", self.rnti, message_type_of(&msg));
        enb.recv_rrc_connection_reestablishment_complete(self.rnti, msg);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdcp::{PdcpSapProvider, TransmitPdcpSduParameters};
    use crate::rlc::{RlcSapProvider, TransmitPdcpPduParameters};
    use crate::rrc::member::{
        EnbRrcSapProviderOwner, MemberEnbRrcSapProvider, MemberUeRrcSapProvider,
        UeRrcSapProviderOwner,
    };
    use common::types::{Bandwidth, Pci};
    use interfaces::{
        AsConfig, CellAccessRelatedInfo, DrbToAddMod, LogicalChannelConfig, MeasConfig,
        MobilityControlInfo, PlmnIdentityInfo, PreambleInfo, RachConfigCommon,
        RadioResourceConfigCommon, RadioResourceConfigDedicated, RaSupervisionInfo,
        ReestabUeIdentity, ReestablishmentCause, RlcConfig, SrbToAddMod, FreqInfo,
        RadioResourceConfigCommonSib, SystemInformationBlockType2,
    };

    struct NullSrb;

    impl RlcSapProvider for NullSrb {
        fn transmit_pdcp_pdu(&self, _params: TransmitPdcpPduParameters) {}
    }

    impl PdcpSapProvider for NullSrb {
        fn transmit_pdcp_sdu(&self, _params: TransmitPdcpSduParameters) {}
    }

    fn enb_srbs() -> SetupUeParameters {
        SetupUeParameters {
            srb0_sap_provider: Arc::new(NullSrb),
            srb1_sap_provider: Arc::new(NullSrb),
        }
    }

    fn ue_srbs() -> SetupParameters {
        SetupParameters {
            srb0_sap_provider: Arc::new(NullSrb),
            srb1_sap_provider: Arc::new(NullSrb),
        }
    }

    /// eNB controller answering each connection request with a setup
    struct EnbController {
        sap_user: Arc<dyn EnbRrcSapUser>,
        setup_tid: u8,
        events: Mutex<Vec<String>>,
    }

    impl EnbController {
        fn record(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl EnbRrcSapProviderOwner for EnbController {
        fn do_complete_setup_ue(&self, rnti: Rnti, _params: CompleteSetupUeParameters) {
            self.record(format!("complete setup {}", rnti));
        }

        fn do_recv_rrc_connection_request(&self, rnti: Rnti, msg: RrcConnectionRequest) {
            self.record(format!("request {} {:#x}", rnti, msg.ue_identity));
            self.sap_user
                .send_rrc_connection_setup(rnti, RrcConnectionSetup {
                    rrc_transaction_identifier: self.setup_tid,
                    radio_resource_config_dedicated: RadioResourceConfigDedicated {
                        srb_to_add_mod_list: vec![SrbToAddMod {
                            srb_identity: 1,
                            logical_channel_config: logical_channel(1),
                        }],
                        ..Default::default()
                    },
                })
                .unwrap();
        }

        fn do_recv_rrc_connection_setup_completed(&self, rnti: Rnti, msg: RrcConnectionSetupCompleted) {
            self.record(format!("setup completed {} {}", rnti, msg.rrc_transaction_identifier));
        }

        fn do_recv_rrc_connection_reconfiguration_completed(
            &self,
            rnti: Rnti,
            msg: RrcConnectionReconfigurationCompleted,
        ) {
            self.record(format!("reconfiguration completed {} {}", rnti, msg.rrc_transaction_identifier));
        }

        fn do_recv_rrc_connection_reestablishment_request(
            &self,
            rnti: Rnti,
            msg: RrcConnectionReestablishmentRequest,
        ) {
            self.record(format!("reestablishment request {} {:?}", rnti, msg.reestablishment_cause));
        }

        fn do_recv_rrc_connection_reestablishment_complete(
            &self,
            rnti: Rnti,
            msg: RrcConnectionReestablishmentComplete,
        ) {
            self.record(format!("reestablishment complete {} {}", rnti, msg.rrc_transaction_identifier));
        }
    }

    /// UE controller acknowledging setups and reconfigurations
    struct UeController {
        sap_user: Arc<dyn UeRrcSapUser>,
        events: Mutex<Vec<String>>,
        system_information: Mutex<Vec<SystemInformation>>,
    }

    impl UeController {
        fn record(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl UeRrcSapProviderOwner for UeController {
        fn do_recv_master_information_block(&self, msg: MasterInformationBlock) {
            self.record(format!("mib {}", msg.system_frame_number));
        }

        fn do_recv_system_information_block_type1(&self, msg: SystemInformationBlockType1) {
            self.record(format!("sib1 {}", msg.cell_access_related_info.cell_identity));
        }

        fn do_recv_system_information(&self, msg: SystemInformation) {
            self.record(format!("si {}", msg.sib2.is_some()));
            self.system_information.lock().unwrap().push(msg);
        }

        fn do_recv_rrc_connection_setup(&self, msg: RrcConnectionSetup) {
            self.record(format!("setup {}", msg.rrc_transaction_identifier));
            self.sap_user.send_rrc_connection_setup_completed(msg.completed()).unwrap();
        }

        fn do_recv_rrc_connection_reconfiguration(&self, msg: RrcConnectionReconfiguration) {
            self.record(format!("reconfiguration {}", msg.rrc_transaction_identifier));
            self.sap_user
                .send_rrc_connection_reconfiguration_completed(msg.completed())
                .unwrap();
        }

        fn do_recv_rrc_connection_reestablishment(&self, msg: RrcConnectionReestablishment) {
            self.record(format!("reestablishment {}", msg.rrc_transaction_identifier));
            self.sap_user
                .send_rrc_connection_reestablishment_complete(msg.complete())
                .unwrap();
        }

        fn do_recv_rrc_connection_reestablishment_reject(&self, _msg: RrcConnectionReestablishmentReject) {
            self.record("reestablishment reject".into());
        }

        fn do_recv_rrc_connection_release(&self, _msg: RrcConnectionRelease) {
            self.record("release".into());
        }
    }

    struct Cell {
        protocol: Arc<EnbRrcProtocolIdeal>,
        enb: Arc<EnbController>,
        enb_sap: Arc<dyn EnbRrcSapProvider>,
    }

    fn cell() -> Cell {
        let protocol = Arc::new(EnbRrcProtocolIdeal::new());
        let enb = Arc::new(EnbController {
            sap_user: protocol.clone(),
            setup_tid: 3,
            events: Mutex::new(Vec::new()),
        });
        let enb_sap: Arc<dyn EnbRrcSapProvider> = Arc::new(MemberEnbRrcSapProvider::new(&enb));
        protocol.set_enb_rrc_sap_provider(enb_sap.clone());
        Cell { protocol, enb, enb_sap }
    }

    fn attach(cell: &Cell, rnti: Rnti) -> (Arc<UeRrcProtocolIdeal>, Arc<UeController>) {
        let ue_protocol = Arc::new(UeRrcProtocolIdeal::new(rnti));
        ue_protocol.connect(cell.enb_sap.clone());
        let ue = Arc::new(UeController {
            sap_user: ue_protocol.clone(),
            events: Mutex::new(Vec::new()),
            system_information: Mutex::new(Vec::new()),
        });
        cell.protocol.attach_ue(rnti, Arc::new(MemberUeRrcSapProvider::new(&ue)));
        cell.protocol.setup_ue(rnti, enb_srbs()).unwrap();
        ue_protocol.setup(ue_srbs()).unwrap();
        (ue_protocol, ue)
    }

    fn logical_channel(priority: u8) -> LogicalChannelConfig {
        LogicalChannelConfig {
            priority,
            prioritized_bit_rate_kbps: 0,
            bucket_size_duration_ms: 100,
            logical_channel_group: 1,
        }
    }

    fn drb(eps_bearer_identity: u8, drb_identity: u8) -> DrbToAddMod {
        DrbToAddMod {
            eps_bearer_identity,
            drb_identity,
            rlc_config: RlcConfig::Am,
            logical_channel_identity: drb_identity + 2,
            logical_channel_config: logical_channel(10 + drb_identity),
        }
    }

    #[test]
    fn test_connection_setup_scenario() {
        common::logging::init_logging("debug");

        let cell = cell();
        let (ue_protocol, ue) = attach(&cell, Rnti::new(17));

        ue_protocol
            .send_rrc_connection_request(RrcConnectionRequest { ue_identity: 0x1122334455667788 })
            .unwrap();

        assert_eq!(
            cell.enb.events(),
            vec![
                "complete setup 17",
                "request 17 0x1122334455667788",
                "setup completed 17 3",
            ]
        );
        assert_eq!(ue.events(), vec!["setup 3"]);
    }

    #[test]
    fn test_per_session_fifo() {
        let cell = cell();
        let (_ue17, ue17) = attach(&cell, Rnti::new(17));
        let (_ue18, ue18) = attach(&cell, Rnti::new(18));

        for tid in 0..50u8 {
            let rnti = if tid % 3 == 0 { Rnti::new(18) } else { Rnti::new(17) };
            cell.protocol
                .send_rrc_connection_reconfiguration(rnti, RrcConnectionReconfiguration {
                    rrc_transaction_identifier: tid,
                    meas_config: Some(MeasConfig),
                    mobility_control_info: None,
                    radio_resource_config_dedicated: None,
                })
                .unwrap();
        }

        let expected = |rnti: u16| -> Vec<String> {
            (0..50u8)
                .filter(|tid| (tid % 3 == 0) == (rnti == 18))
                .map(|tid| format!("reconfiguration {}", tid))
                .collect()
        };
        assert_eq!(ue17.events(), expected(17));
        assert_eq!(ue18.events(), expected(18));

        let completions: Vec<String> = cell
            .enb
            .events()
            .into_iter()
            .filter(|event| event.starts_with("reconfiguration completed 17"))
            .collect();
        let expected_completions: Vec<String> = (0..50u8)
            .filter(|tid| tid % 3 != 0)
            .map(|tid| format!("reconfiguration completed 17 {}", tid))
            .collect();
        assert_eq!(completions, expected_completions);
    }

    #[test]
    fn test_send_to_unknown_session() {
        let cell = cell();
        let (_ue_protocol, ue) = attach(&cell, Rnti::new(17));

        assert!(matches!(
            cell.protocol.send_rrc_connection_release(Rnti::new(99), RrcConnectionRelease),
            Err(SapError::UnknownSession(rnti)) if rnti == Rnti::new(99)
        ));

        cell.protocol.remove_ue(Rnti::new(17)).unwrap();
        assert!(matches!(
            cell.protocol.remove_ue(Rnti::new(17)),
            Err(SapError::UnknownSession(_))
        ));
        assert!(matches!(
            cell.protocol.send_rrc_connection_release(Rnti::new(17), RrcConnectionRelease),
            Err(SapError::UnknownSession(_))
        ));
        assert!(ue.events().is_empty());
    }

    #[test]
    fn test_send_without_attached_ue() {
        let cell = cell();
        cell.protocol.setup_ue(Rnti::new(40), enb_srbs()).unwrap();

        assert!(matches!(
            cell.protocol.send_rrc_connection_reestablishment_reject(
                Rnti::new(40),
                RrcConnectionReestablishmentReject
            ),
            Err(SapError::UeNotAttached(rnti)) if rnti == Rnti::new(40)
        ));
    }

    #[test]
    fn test_setup_ue_requires_enb_provider() {
        let protocol = EnbRrcProtocolIdeal::new();
        assert!(matches!(
            protocol.setup_ue(Rnti::new(1), enb_srbs()),
            Err(SapError::NotConnected)
        ));
        assert!(protocol.sessions().is_empty());
    }

    #[test]
    fn test_duplicate_setup_ue() {
        let cell = cell();
        cell.protocol.setup_ue(Rnti::new(7), enb_srbs()).unwrap();
        assert!(matches!(
            cell.protocol.setup_ue(Rnti::new(7), enb_srbs()),
            Err(SapError::SessionExists(_))
        ));
        // Only the first setup reaches the controller
        assert_eq!(cell.enb.events(), vec!["complete setup 7"]);
        assert!(cell.protocol.sessions().get(Rnti::new(7)).unwrap().complete.is_some());
    }

    #[test]
    fn test_broadcast_reaches_attached_ues() {
        let cell = cell();
        let (_ue1, ue1) = attach(&cell, Rnti::new(1));
        let (_ue2, ue2) = attach(&cell, Rnti::new(2));

        cell.protocol
            .send_master_information_block(MasterInformationBlock {
                dl_bandwidth: Bandwidth::Rb50,
                system_frame_number: 12,
            })
            .unwrap();
        cell.protocol
            .send_system_information_block_type1(SystemInformationBlockType1 {
                cell_access_related_info: CellAccessRelatedInfo {
                    plmn_identity_info: PlmnIdentityInfo { plmn_identity: 0x0002F839 },
                    cell_identity: 1,
                    csg_indication: false,
                    csg_identity: 0,
                },
            })
            .unwrap();
        let si = SystemInformation {
            sib2: Some(SystemInformationBlockType2 {
                radio_resource_config_common: RadioResourceConfigCommonSib {
                    rach_config_common: RachConfigCommon {
                        preamble_info: PreambleInfo { number_of_ra_preambles: 52 },
                        ra_supervision_info: RaSupervisionInfo {
                            preamble_trans_max: 50,
                            ra_response_window_size: 10,
                        },
                    },
                },
                freq_info: FreqInfo {
                    ul_carrier_freq: 18100,
                    ul_bandwidth: Bandwidth::Rb50,
                },
            }),
        };
        cell.protocol.send_system_information(si).unwrap();

        let expected = vec!["mib 12", "sib1 1", "si true"];
        assert_eq!(ue1.events(), expected);
        assert_eq!(ue2.events(), expected);
        assert_eq!(*ue1.system_information.lock().unwrap(), vec![si]);
        assert_eq!(*ue2.system_information.lock().unwrap(), vec![si]);

        assert!(cell.protocol.detach_ue(Rnti::new(2)));
        assert!(!cell.protocol.detach_ue(Rnti::new(2)));
        cell.protocol.send_system_information(SystemInformation::default()).unwrap();
        assert_eq!(ue1.events().len(), 4);
        assert_eq!(ue2.events().len(), 3);
        assert_eq!(ue1.system_information.lock().unwrap()[1].sib2, None);
    }

    #[test]
    fn test_reestablishment_round_trip() {
        let cell = cell();
        let (ue_protocol, ue) = attach(&cell, Rnti::new(17));

        ue_protocol.reestablish().unwrap();
        ue_protocol
            .send_rrc_connection_reestablishment_request(RrcConnectionReestablishmentRequest {
                ue_identity: ReestabUeIdentity {
                    c_rnti: Rnti::new(17),
                    phys_cell_id: Pci::new(1).unwrap(),
                },
                reestablishment_cause: ReestablishmentCause::OtherFailure,
            })
            .unwrap();
        cell.protocol
            .send_rrc_connection_reestablishment(Rnti::new(17), RrcConnectionReestablishment {
                rrc_transaction_identifier: 9,
                radio_resource_config_dedicated: RadioResourceConfigDedicated::default(),
            })
            .unwrap();

        assert_eq!(ue.events(), vec!["reestablishment 9"]);
        assert_eq!(
            cell.enb.events()[1..],
            ["reestablishment request 17 OtherFailure", "reestablishment complete 17 9"]
        );
    }

    #[test]
    fn test_ue_protocol_not_connected() {
        let ue_protocol = UeRrcProtocolIdeal::new(Rnti::new(3));
        assert!(matches!(
            ue_protocol.send_rrc_connection_request(RrcConnectionRequest { ue_identity: 1 }),
            Err(SapError::NotConnected)
        ));
    }

    #[test]
    fn test_ue_setup_once_per_connection() {
        let ue_protocol = UeRrcProtocolIdeal::new(Rnti::new(3));
        assert!(!ue_protocol.is_setup());

        ue_protocol.setup(ue_srbs()).unwrap();
        assert!(ue_protocol.is_setup());
        assert!(matches!(ue_protocol.setup(ue_srbs()), Err(SapError::AlreadySetup)));

        // Reestablishment starts a new connection
        ue_protocol.reestablish().unwrap();
        assert!(!ue_protocol.is_setup());
        ue_protocol.setup(ue_srbs()).unwrap();
    }

    #[test]
    fn test_handover_payload_integrity() {
        let cell = cell();
        let info = HandoverPreparationInfo {
            as_config: AsConfig {
                source_meas_config: MeasConfig,
                source_radio_resource_config: RadioResourceConfigDedicated {
                    srb_to_add_mod_list: vec![SrbToAddMod {
                        srb_identity: 1,
                        logical_channel_config: logical_channel(1),
                    }],
                    drb_to_add_mod_list: vec![drb(5, 1), drb(6, 2)],
                    drb_to_release_list: vec![],
                    physical_config_dedicated: None,
                },
                source_ue_identity: Rnti::new(17),
                source_master_information_block: MasterInformationBlock {
                    dl_bandwidth: Bandwidth::Rb25,
                    system_frame_number: 0,
                },
                source_system_information_block_type1: SystemInformationBlockType1::default(),
                source_dl_carrier_freq: 100,
            },
        };

        let encoded = cell.protocol.encode_handover_preparation_information(info.clone()).unwrap();
        let decoded = cell.protocol.decode_handover_preparation_information(encoded).unwrap();
        assert_eq!(decoded, info);

        // Bearer lists are sets; the same bearers in another order still match
        let mut reordered = info.as_config.source_radio_resource_config.clone();
        reordered.drb_to_add_mod_list.reverse();
        assert!(decoded.as_config.source_radio_resource_config.same_bearers(&reordered));

        let command = RrcConnectionReconfiguration {
            rrc_transaction_identifier: 4,
            meas_config: None,
            mobility_control_info: Some(MobilityControlInfo {
                target_phys_cell_id: Pci::new(2).unwrap(),
                carrier_freq: None,
                carrier_bandwidth: None,
                new_ue_identity: Rnti::new(61),
                radio_resource_config_common: RadioResourceConfigCommon {
                    rach_config_common: RachConfigCommon {
                        preamble_info: PreambleInfo { number_of_ra_preambles: 52 },
                        ra_supervision_info: RaSupervisionInfo {
                            preamble_trans_max: 50,
                            ra_response_window_size: 10,
                        },
                    },
                },
                rach_config_dedicated: None,
            }),
            radio_resource_config_dedicated: None,
        };
        let encoded = cell.protocol.encode_handover_command(command.clone()).unwrap();
        let decoded = cell.protocol.decode_handover_command(encoded).unwrap();
        assert!(decoded.is_handover_command());
        assert_eq!(decoded, command);
    }

    #[test]
    fn test_decode_failure_surfaces_codec_error() {
        let cell = cell();
        let encoded = cell
            .protocol
            .encode_handover_command(RrcConnectionReconfiguration {
                rrc_transaction_identifier: 1,
                meas_config: None,
                mobility_control_info: None,
                radio_resource_config_dedicated: None,
            })
            .unwrap();

        // A handover command is not handover preparation information
        assert!(matches!(
            cell.protocol.decode_handover_preparation_information(encoded),
            Err(SapError::Codec(_))
        ));
        assert!(matches!(
            cell.protocol.decode_handover_command(Bytes::from_static(&[0xC7, 0x01])),
            Err(SapError::Codec(_))
        ));
    }

    #[test]
    fn test_with_config_limits_sessions() {
        let config = RrcSapConfig { max_sessions: 1, ..Default::default() };
        let protocol = Arc::new(EnbRrcProtocolIdeal::with_config(&config).unwrap());
        let enb = Arc::new(EnbController {
            sap_user: protocol.clone(),
            setup_tid: 0,
            events: Mutex::new(Vec::new()),
        });
        protocol.set_enb_rrc_sap_provider(Arc::new(MemberEnbRrcSapProvider::new(&enb)));

        protocol.setup_ue(Rnti::new(1), enb_srbs()).unwrap();
        assert!(matches!(
            protocol.setup_ue(Rnti::new(2), enb_srbs()),
            Err(SapError::SessionLimitReached(1))
        ));

        let invalid = RrcSapConfig { max_sessions: 0, ..Default::default() };
        assert!(matches!(
            EnbRrcProtocolIdeal::with_config(&invalid),
            Err(SapError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_srb_user_counts_dropped_pdus() {
        let srb = IdealSrbUser::new(Rnti::new(1));
        assert_eq!(srb.dropped(), 0);

        srb.receive_pdcp_pdu(Bytes::from_static(b"rrc"));
        srb.receive_pdcp_sdu(ReceivePdcpSduParameters {
            pdcp_sdu: Bytes::from_static(b"rrc"),
            rnti: Rnti::new(1),
            lcid: 1,
        });
        assert_eq!(srb.dropped(), 2);
    }

    /// UE whose release handler blocks until the test lets it return
    struct BlockingUe {
        entered: Mutex<std::sync::mpsc::Sender<()>>,
        proceed: Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl UeRrcSapProvider for BlockingUe {
        fn recv_master_information_block(&self, _msg: MasterInformationBlock) {}
        fn recv_system_information_block_type1(&self, _msg: SystemInformationBlockType1) {}
        fn recv_system_information(&self, _msg: SystemInformation) {}
        fn recv_rrc_connection_setup(&self, _msg: RrcConnectionSetup) {}
        fn recv_rrc_connection_reconfiguration(&self, _msg: RrcConnectionReconfiguration) {}
        fn recv_rrc_connection_reestablishment(&self, _msg: RrcConnectionReestablishment) {}
        fn recv_rrc_connection_reestablishment_reject(&self, _msg: RrcConnectionReestablishmentReject) {}

        fn recv_rrc_connection_release(&self, _msg: RrcConnectionRelease) {
            self.entered.lock().unwrap().send(()).unwrap();
            self.proceed.lock().unwrap().recv().unwrap();
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_remove_ue_waits_for_in_flight_send() {
        let cell = cell();
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (proceed_tx, proceed_rx) = std::sync::mpsc::channel();
        cell.protocol.attach_ue(
            Rnti::new(17),
            Arc::new(BlockingUe {
                entered: Mutex::new(entered_tx),
                proceed: Mutex::new(proceed_rx),
            }),
        );
        cell.protocol.setup_ue(Rnti::new(17), enb_srbs()).unwrap();

        let sender = {
            let protocol = cell.protocol.clone();
            tokio::task::spawn_blocking(move || {
                protocol.send_rrc_connection_release(Rnti::new(17), RrcConnectionRelease)
            })
        };
        entered_rx.recv().unwrap();

        let remover = {
            let protocol = cell.protocol.clone();
            tokio::task::spawn_blocking(move || protocol.remove_ue(Rnti::new(17)))
        };

        // Removal refuses new sends at once but holds until the delivery returns
        let mut closed = false;
        for _ in 0..200 {
            if cell.protocol.sessions().enter(Rnti::new(17)).is_err() {
                closed = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert!(closed);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!remover.is_finished());
        assert!(cell.protocol.sessions().contains(Rnti::new(17)));

        proceed_tx.send(()).unwrap();
        sender.await.unwrap().unwrap();
        remover.await.unwrap().unwrap();
        assert!(!cell.protocol.sessions().contains(Rnti::new(17)));
    }

    /// UE that removes its own session from inside a delivery
    struct SelfRemovingUe {
        protocol: Arc<EnbRrcProtocolIdeal>,
        rnti: Rnti,
        outcome: Mutex<Option<Result<(), SapError>>>,
    }

    impl UeRrcSapProvider for SelfRemovingUe {
        fn recv_master_information_block(&self, _msg: MasterInformationBlock) {}
        fn recv_system_information_block_type1(&self, _msg: SystemInformationBlockType1) {}
        fn recv_system_information(&self, _msg: SystemInformation) {}
        fn recv_rrc_connection_setup(&self, _msg: RrcConnectionSetup) {}
        fn recv_rrc_connection_reconfiguration(&self, _msg: RrcConnectionReconfiguration) {}
        fn recv_rrc_connection_reestablishment(&self, _msg: RrcConnectionReestablishment) {}
        fn recv_rrc_connection_reestablishment_reject(&self, _msg: RrcConnectionReestablishmentReject) {}

        fn recv_rrc_connection_release(&self, _msg: RrcConnectionRelease) {
            *self.outcome.lock().unwrap() = Some(self.protocol.remove_ue(self.rnti));
        }
    }

    #[test]
    fn test_remove_ue_from_own_delivery_rejected() {
        let cell = cell();
        let ue = Arc::new(SelfRemovingUe {
            protocol: cell.protocol.clone(),
            rnti: Rnti::new(17),
            outcome: Mutex::new(None),
        });
        cell.protocol.attach_ue(Rnti::new(17), ue.clone());
        cell.protocol.setup_ue(Rnti::new(17), enb_srbs()).unwrap();

        cell.protocol
            .send_rrc_connection_release(Rnti::new(17), RrcConnectionRelease)
            .unwrap();
        assert!(matches!(
            ue.outcome.lock().unwrap().take(),
            Some(Err(SapError::SessionBusy(rnti))) if rnti == Rnti::new(17)
        ));

        // Once the delivery has returned the session can go
        cell.protocol.remove_ue(Rnti::new(17)).unwrap();
        cell.protocol.detach_ue(Rnti::new(17));
    }
}
