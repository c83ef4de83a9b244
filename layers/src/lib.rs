//! Protocol Stack Layers Library
//!
//! This crate implements the LTE RRC service access points (3GPP TS 36.331)
//! between the UE RRC and eNB RRC entities, together with the lower-layer
//! SAP handles they carry.

pub mod config;
pub mod pdcp;
pub mod rlc;
pub mod rrc;

use common::types::Rnti;
use interfaces::InterfaceError;
use thiserror::Error;

/// Common errors for the RRC SAPs
#[derive(Error, Debug)]
pub enum SapError {
    #[error("Unknown session: RNTI {0}")]
    UnknownSession(Rnti),

    #[error("Session already exists: RNTI {0}")]
    SessionExists(Rnti),

    #[error("Session limit of {0} reached")]
    SessionLimitReached(usize),

    #[error("Session busy: RNTI {0} cannot be removed while delivering to it")]
    SessionBusy(Rnti),

    #[error("No UE attached for RNTI {0}")]
    UeNotAttached(Rnti),

    #[error("SAP not connected to a peer")]
    NotConnected,

    #[error("Signalling radio bearers already set up")]
    AlreadySetup,

    #[error("SAP owner no longer exists")]
    OwnerGone,

    #[error("Codec error: {0}")]
    Codec(#[from] InterfaceError),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
