//! # Bus Module
//!
//! Handles the SPI link to the pad port.
//!
//! This module handles:
//! - The [`Transport`] capability the protocol engine runs on
//! - Opening the Raspberry Pi SPI controller, one slave select per pad
//! - Applying mode, word size, clock speed and inter-transfer delay

pub mod transport;

pub use transport::{BusSettings, SpiMode, Transport};

use rppal::spi::{Bus, Mode, Segment, SlaveSelect, Spi};
use tracing::{debug, info};

use crate::error::{PadError, Result};
use crate::pad::state::PadChannel;
use transport::check_lengths;

/// Pad port on the Raspberry Pi SPI controller
///
/// Owns one `Spi` handle per channel; channel `n` is wired to the `n`th
/// slave-select line given at open time. Handles close on drop.
pub struct SpiBus {
    handles: Vec<Spi>,
    bus: u8,
    slave_selects: Vec<u8>,
    delay_us: u16,
}

impl std::fmt::Debug for SpiBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpiBus")
            .field("bus", &self.bus)
            .field("slave_selects", &self.slave_selects)
            .field("delay_us", &self.delay_us)
            .finish_non_exhaustive()
    }
}

impl SpiBus {
    /// Open the SPI controller `bus` with one handle per slave select
    ///
    /// # Arguments
    ///
    /// * `bus` - SPI controller index (0-6)
    /// * `slave_selects` - Slave-select line for each pad, in channel order
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unknown bus or slave-select index and
    /// `Transport` if the kernel device cannot be opened.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use psxpad::bus::SpiBus;
    ///
    /// let bus = SpiBus::open(0, &[0])?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(bus: u8, slave_selects: &[u8]) -> Result<Self> {
        let spi_bus = map_bus(bus)?;
        let defaults = BusSettings::default();

        let mut handles = Vec::with_capacity(slave_selects.len());
        for &ss in slave_selects {
            debug!("Opening SPI{} slave select {}", bus, ss);
            let spi = Spi::new(spi_bus, map_slave_select(ss)?, defaults.clock_hz, map_mode(defaults.mode))
                .map_err(|e| PadError::Transport(format!("Failed to open SPI{}.{}: {}", bus, ss, e)))?;
            handles.push(spi);
        }

        info!("Opened SPI{} with slave selects {:?}", bus, slave_selects);

        Ok(Self {
            handles,
            bus,
            slave_selects: slave_selects.to_vec(),
            delay_us: defaults.delay_us,
        })
    }

    fn handle(&self, channel: PadChannel) -> Result<&Spi> {
        self.handles.get(channel.index()).ok_or_else(|| {
            PadError::InvalidArgument(format!(
                "channel {} has no slave select on SPI{}",
                channel.index(),
                self.bus
            ))
        })
    }
}

impl Transport for SpiBus {
    fn configure(&mut self, settings: &BusSettings) -> Result<()> {
        for (spi, ss) in self.handles.iter().zip(&self.slave_selects) {
            spi.set_mode(map_mode(settings.mode))
                .map_err(|e| PadError::Transport(format!("Failed to set mode on SPI{}.{}: {}", self.bus, ss, e)))?;
            spi.set_bits_per_word(settings.bits_per_word)
                .map_err(|e| PadError::Transport(format!("Failed to set word size on SPI{}.{}: {}", self.bus, ss, e)))?;
            spi.set_clock_speed(settings.clock_hz)
                .map_err(|e| PadError::Transport(format!("Failed to set clock on SPI{}.{}: {}", self.bus, ss, e)))?;
        }
        self.delay_us = settings.delay_us;

        info!(
            "SPI{} configured: mode {:?}, {} bits per word, {} Hz ({} kHz), {} us delay",
            self.bus,
            settings.mode,
            settings.bits_per_word,
            settings.clock_hz,
            settings.clock_hz / 1000,
            settings.delay_us
        );
        Ok(())
    }

    fn transfer(&mut self, channel: PadChannel, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        check_lengths(tx, rx)?;

        let delay_us = self.delay_us;
        let spi = self.handle(channel)?;

        let mut segment = Segment::new(rx, tx);
        segment.set_delay(delay_us);

        spi.transfer_segments(&[segment])
            .map_err(|e| PadError::Transport(format!("Failed to transfer on channel {}: {}", channel.index(), e)))
    }
}

fn map_bus(bus: u8) -> Result<Bus> {
    match bus {
        0 => Ok(Bus::Spi0),
        1 => Ok(Bus::Spi1),
        2 => Ok(Bus::Spi2),
        3 => Ok(Bus::Spi3),
        4 => Ok(Bus::Spi4),
        5 => Ok(Bus::Spi5),
        6 => Ok(Bus::Spi6),
        other => Err(PadError::InvalidArgument(format!("SPI bus {} does not exist (0-6)", other))),
    }
}

fn map_slave_select(ss: u8) -> Result<SlaveSelect> {
    match ss {
        0 => Ok(SlaveSelect::Ss0),
        1 => Ok(SlaveSelect::Ss1),
        2 => Ok(SlaveSelect::Ss2),
        other => Err(PadError::InvalidArgument(format!("slave select {} is not supported (0-2)", other))),
    }
}

fn map_mode(mode: SpiMode) -> Mode {
    match mode {
        SpiMode::Mode0 => Mode::Mode0,
        SpiMode::Mode1 => Mode::Mode1,
        SpiMode::Mode2 => Mode::Mode2,
        SpiMode::Mode3 => Mode::Mode3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_bus() {
        assert!(matches!(map_bus(0), Ok(Bus::Spi0)));
        assert!(matches!(map_bus(6), Ok(Bus::Spi6)));
        assert!(matches!(map_bus(7), Err(PadError::InvalidArgument(_))));
    }

    #[test]
    fn test_map_slave_select() {
        assert!(matches!(map_slave_select(0), Ok(SlaveSelect::Ss0)));
        assert!(matches!(map_slave_select(1), Ok(SlaveSelect::Ss1)));
        assert!(map_slave_select(9).is_err());
    }

    #[test]
    fn test_map_mode() {
        assert!(matches!(map_mode(SpiMode::Mode3), Mode::Mode3));
        assert!(matches!(map_mode(SpiMode::Mode0), Mode::Mode0));
    }

    #[test]
    fn test_open_invalid_bus_returns_error() {
        let result = SpiBus::open(9, &[0]);
        match result {
            Err(PadError::InvalidArgument(msg)) => assert!(msg.contains("SPI bus 9")),
            other => panic!("Expected InvalidArgument, got: {:?}", other),
        }
    }

    // Integration test - only runs on a Raspberry Pi with SPI enabled
    #[test]
    #[ignore] // Run with: cargo test -- --ignored
    fn test_poll_with_real_hardware() {
        use crate::protocol::command::POLL;
        use crate::protocol::frame::reverse_in_place;

        let mut bus = SpiBus::open(0, &[0]).expect("SPI0.0 not available");
        bus.configure(&BusSettings::default()).unwrap();

        let mut tx = POLL;
        reverse_in_place(&mut tx);
        let mut rx = [0u8; 21];
        bus.transfer(PadChannel::new(0), &tx, &mut rx).unwrap();
        reverse_in_place(&mut rx);

        println!("Poll response: {:02X?}", rx);
    }
}
