//! Radio Link Control (RLC) SAP Handles
//! 
//! SRB0 messages are carried by RLC TM directly below RRC. The RRC SAPs never
//! call into these handles; they only hand them to the entity that owns the bearer.

use bytes::Bytes;
use common::types::Rnti;

/// Parameters for a PDU handed to RLC for transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitPdcpPduParameters {
    /// The PDU to transmit
    pub pdcp_pdu: Bytes,
    /// RNTI of the UE
    pub rnti: Rnti,
    /// Logical channel identity
    pub lcid: u8,
}

/// SAP offered by an RLC entity to the layer above
pub trait RlcSapProvider: Send + Sync {
    /// Transmit a PDU on the entity's logical channel
    fn transmit_pdcp_pdu(&self, params: TransmitPdcpPduParameters);
}

/// SAP through which an RLC entity delivers received PDUs upwards
pub trait RlcSapUser: Send + Sync {
    /// Deliver a received PDU
    fn receive_pdcp_pdu(&self, pdu: Bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Loopback {
        delivered: Mutex<Vec<Bytes>>,
    }

    impl RlcSapProvider for Loopback {
        fn transmit_pdcp_pdu(&self, params: TransmitPdcpPduParameters) {
            self.receive_pdcp_pdu(params.pdcp_pdu);
        }
    }

    impl RlcSapUser for Loopback {
        fn receive_pdcp_pdu(&self, pdu: Bytes) {
            self.delivered.lock().unwrap().push(pdu);
        }
    }

    #[test]
    fn test_rlc_sap_handles_as_trait_objects() {
        let entity = Arc::new(Loopback::default());
        let provider: Arc<dyn RlcSapProvider> = entity.clone();

        provider.transmit_pdcp_pdu(TransmitPdcpPduParameters {
            pdcp_pdu: Bytes::from_static(&[0x40, 0x12]),
            rnti: Rnti::new(17),
            lcid: 0,
        });

        assert_eq!(entity.delivered.lock().unwrap().as_slice(), &[Bytes::from_static(&[0x40, 0x12])]);
    }
}
