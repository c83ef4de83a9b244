//! Packet Data Convergence Protocol (PDCP) SAP Handles
//! 
//! SRB1 messages go through a PDCP entity. As with RLC, the RRC SAPs only pass
//! these handles through to the bearer owner.

use bytes::Bytes;
use common::types::Rnti;

/// Parameters for an SDU handed to PDCP for transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitPdcpSduParameters {
    /// The RRC PDU to transmit
    pub pdcp_sdu: Bytes,
    /// RNTI of the UE
    pub rnti: Rnti,
    /// Logical channel identity
    pub lcid: u8,
}

/// Parameters for an SDU delivered by PDCP to RRC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivePdcpSduParameters {
    /// The received RRC PDU
    pub pdcp_sdu: Bytes,
    /// RNTI of the UE
    pub rnti: Rnti,
    /// Logical channel identity
    pub lcid: u8,
}

/// SAP offered by a PDCP entity to RRC
pub trait PdcpSapProvider: Send + Sync {
    /// Transmit an RRC PDU
    fn transmit_pdcp_sdu(&self, params: TransmitPdcpSduParameters);
}

/// SAP through which a PDCP entity delivers received SDUs to RRC
pub trait PdcpSapUser: Send + Sync {
    /// Deliver a received RRC PDU
    fn receive_pdcp_sdu(&self, params: ReceivePdcpSduParameters);
}
