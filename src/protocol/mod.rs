//! # Pad Protocol Module
//!
//! Wire protocol of PlayStation pads.
//!
//! This module handles:
//! - Bit-order reflection between the protocol and the SPI controller
//! - The fixed command catalog (poll, config session, mode, pressure, motors)
//! - Decoding poll responses into mode-tagged key states

pub mod frame;
pub mod command;
pub mod decoder;
