//! Common Types for the LTE RRC Service Access Points
//!
//! Defines fundamental identifier types shared by the message catalog and the SAP layer

use serde::{Deserialize, Serialize};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt;

/// Radio Network Temporary Identifier (RNTI)
///
/// The base station uses the C-RNTI as the session identifier of an attached UE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Rnti(pub u16);

impl Rnti {
    /// Create a new RNTI
    pub fn new(value: u16) -> Self {
        Self(value)
    }

    /// Get the RNTI value
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Rnti {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical Cell Identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Pci(u16);

impl Pci {
    /// Maximum valid E-UTRA PCI value (0-503)
    pub const MAX: u16 = 503;

    /// Create a new PCI with validation
    pub fn new(value: u16) -> Option<Self> {
        if value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Get the PCI value
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for Pci {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Pci::new(value).ok_or_else(|| format!("PCI {} out of range 0..={}", value, Pci::MAX))
    }
}

impl From<Pci> for u16 {
    fn from(pci: Pci) -> Self {
        pci.0
    }
}

/// E-UTRA transmission bandwidth in resource blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize)]
pub enum Bandwidth {
    /// 1.4 MHz
    Rb6 = 6,
    /// 3 MHz
    Rb15 = 15,
    /// 5 MHz
    Rb25 = 25,
    /// 10 MHz
    Rb50 = 50,
    /// 15 MHz
    Rb75 = 75,
    /// 20 MHz
    Rb100 = 100,
}

impl Bandwidth {
    /// Look up the bandwidth for a resource block count
    pub fn from_rbs(rbs: u8) -> Option<Self> {
        Self::from_u8(rbs)
    }

    /// Number of resource blocks
    pub fn rbs(&self) -> u8 {
        *self as u8
    }
}

/// PLMN Identity (MCC + MNC)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlmnId {
    /// Mobile Country Code
    pub mcc: [u8; 3],
    /// Mobile Network Code (2 or 3 digits)
    pub mnc: [u8; 3],
    /// MNC length (2 or 3)
    pub mnc_len: u8,
}

impl PlmnId {
    /// Create a new PLMN ID
    pub fn new(mcc: [u8; 3], mnc: [u8; 3], mnc_len: u8) -> Option<Self> {
        let digits_ok = mcc.iter().chain(mnc.iter()).all(|d| *d <= 9);
        if digits_ok && (mnc_len == 2 || mnc_len == 3) {
            Some(Self { mcc, mnc, mnc_len })
        } else {
            None
        }
    }

    /// Encode to 3-byte format used in 3GPP
    pub fn encode(&self) -> [u8; 3] {
        let mut encoded = [0u8; 3];
        encoded[0] = (self.mcc[1] << 4) | self.mcc[0];
        encoded[1] = if self.mnc_len == 2 {
            0xF0 | self.mcc[2]
        } else {
            (self.mnc[2] << 4) | self.mcc[2]
        };
        encoded[2] = (self.mnc[1] << 4) | self.mnc[0];
        encoded
    }

    /// Pack the encoded octets into the 24-bit value carried by `PlmnIdentityInfo`
    pub fn to_identity(&self) -> u32 {
        let [a, b, c] = self.encode();
        u32::from_be_bytes([0, a, b, c])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pci_validation() {
        assert!(Pci::new(0).is_some());
        assert!(Pci::new(503).is_some());
        assert!(Pci::new(504).is_none());
        assert!(Pci::try_from(1007u16).is_err());
    }

    #[test]
    fn test_bandwidth_conversion() {
        assert_eq!(Bandwidth::from_rbs(25), Some(Bandwidth::Rb25));
        assert_eq!(Bandwidth::from_rbs(24), None);
        assert_eq!(Bandwidth::Rb100.rbs(), 100);
    }

    #[test]
    fn test_plmn_encoding() {
        let plmn = PlmnId::new([2, 0, 8], [9, 3, 0], 2).unwrap();
        assert_eq!(plmn.encode(), [0x02, 0xF8, 0x39]);
        assert_eq!(plmn.to_identity(), 0x0002_F839);
        assert!(PlmnId::new([2, 0, 10], [9, 3, 0], 2).is_none());
    }

    #[test]
    fn test_rnti_display() {
        assert_eq!(Rnti::new(17).to_string(), "17");
    }
}
