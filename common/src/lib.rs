//! Common Utilities and Types Library
//! 
//! This crate provides shared identifier types, byte utilities and the logging
//! bootstrap used across the RRC SAP implementation.

pub mod logging;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use types::*;
pub use utils::*;
