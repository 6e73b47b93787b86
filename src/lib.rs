//! # psxpad Library
//!
//! Poll and configure PlayStation pads over a Raspberry Pi SPI bus.
//!
//! This library provides the pad protocol engine: bit-order framing, the
//! command catalog, the config session handshakes for analog mode and
//! vibration motors, and decoding of poll responses into key states.

pub mod config;
pub mod error;
pub mod protocol;
pub mod pad;
pub mod bus;
