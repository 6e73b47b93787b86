//! # Pad Module
//!
//! Per-pad state, configuration handshakes and the polling manager.
//!
//! This module handles:
//! - Working copies of the poll, set-mode and enable-motors commands per pad
//! - Ordered config sessions (analog mode, motor enable)
//! - Polling every pad once per cycle and decoding the freshest reply

pub mod state;
pub mod sequencer;
pub mod manager;

pub use manager::PadManager;
pub use state::{PadChannel, PadState, MAX_PADS};
