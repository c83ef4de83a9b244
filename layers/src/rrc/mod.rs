//! Radio Resource Control (RRC) Service Access Points
//!
//! The boundary between the UE RRC and eNB RRC entities (3GPP TS 36.331).
//! Each side has an outbound SAP (`*SapUser`), which its controller calls to
//! send, and an inbound SAP (`*SapProvider`), which the peer calls to deliver.
//! Every eNB-side operation is keyed by the UE's C-RNTI.
//!
//! Controllers are bound either by implementing the SAP traits directly or
//! through the forwarders in [`member`]. The [`ideal`] protocol joins both sides
//! in-process, tracking per-UE sessions in a [`session::SessionRegistry`].

pub mod enb_sap;
pub mod ideal;
pub mod member;
pub mod session;
pub mod ue_sap;

pub use enb_sap::{
    CompleteSetupUeParameters, EnbRrcSapProvider, EnbRrcSapUser, SetupUeParameters,
};
pub use ideal::{EnbRrcProtocolIdeal, IdealSrbUser, UeRrcProtocolIdeal};
pub use member::{
    EnbRrcSapProviderOwner, EnbRrcSapUserOwner, MemberEnbRrcSapProvider, MemberEnbRrcSapUser,
    MemberUeRrcSapProvider, MemberUeRrcSapUser, UeRrcSapProviderOwner, UeRrcSapUserOwner,
};
pub use session::{Delivery, Session, SessionRegistry};
pub use ue_sap::{SetupParameters, UeRrcSapProvider, UeRrcSapUser};
