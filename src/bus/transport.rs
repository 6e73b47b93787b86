//! Trait abstraction for the full-duplex bus to enable testing

use serde::Deserialize;

use crate::error::{PadError, Result};
use crate::pad::state::PadChannel;

/// SPI clock polarity/phase mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
pub enum SpiMode {
    Mode0,
    Mode1,
    Mode2,
    Mode3,
}

impl TryFrom<u8> for SpiMode {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(SpiMode::Mode0),
            1 => Ok(SpiMode::Mode1),
            2 => Ok(SpiMode::Mode2),
            3 => Ok(SpiMode::Mode3),
            other => Err(format!("SPI mode must be 0-3, got {}", other)),
        }
    }
}

/// One-time bus setup applied before the first transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusSettings {
    pub mode: SpiMode,
    pub bits_per_word: u8,
    pub clock_hz: u32,
    /// Delay after each transfer, in microseconds
    pub delay_us: u16,
}

impl Default for BusSettings {
    /// Pads clock data on the rising edge with an idle-high clock (mode 3).
    /// 125 kHz is well inside what every pad revision accepts.
    fn default() -> Self {
        Self {
            mode: SpiMode::Mode3,
            bits_per_word: 8,
            clock_hz: 125_000,
            delay_us: 100,
        }
    }
}

/// Trait for synchronous full-duplex bus operations
///
/// Implementations exchange exactly `tx.len()` bytes: `rx` has the same
/// length as `tx` and is filled with what the pad shifted back. Bytes are
/// passed through untouched; bit-order handling lives in the caller.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Apply mode, word size, clock and inter-transfer delay
    fn configure(&mut self, settings: &BusSettings) -> Result<()>;

    /// Exchange `tx` for `rx` with the pad selected by `channel`
    fn transfer(&mut self, channel: PadChannel, tx: &[u8], rx: &mut [u8]) -> Result<()>;
}

/// Reject transfers whose buffers disagree in length
pub(crate) fn check_lengths(tx: &[u8], rx: &[u8]) -> Result<()> {
    if tx.len() != rx.len() {
        return Err(PadError::InvalidArgument(format!(
            "transfer buffers differ in length: tx {} bytes, rx {} bytes",
            tx.len(),
            rx.len()
        )));
    }
    Ok(())
}
