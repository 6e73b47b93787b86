//! # Pad Manager
//!
//! Owns the bus and the state of every pad on it.
//!
//! ## Usage
//!
//! ```no_run
//! use psxpad::bus::{BusSettings, SpiBus};
//! use psxpad::pad::{PadChannel, PadManager};
//!
//! let bus = SpiBus::open(0, &[0])?;
//! let mut pads = PadManager::open(bus, &BusSettings::default(), 1)?;
//! let pad0 = PadChannel::new(0);
//!
//! pads.set_analog_mode(pad0, true, true)?;
//! loop {
//!     pads.poll_all()?;
//!     let state = pads.key_state(pad0)?;
//!     // React to state...
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use tracing::{debug, info, warn};

use crate::bus::{BusSettings, Transport};
use crate::error::{PadError, Result};
use crate::pad::sequencer::{exchange, Sequencer};
use crate::pad::state::{PadChannel, PadState, MAX_PADS};
use crate::protocol::decoder::KeyState;

/// Polls and configures the pads sharing one bus
///
/// The transport is owned for the manager's whole lifetime and released
/// when the manager is dropped.
pub struct PadManager<T: Transport> {
    transport: T,
    pads: Vec<PadState>,
    poll_count: u64,
}

impl<T: Transport> std::fmt::Debug for PadManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PadManager")
            .field("pads", &self.pads)
            .field("poll_count", &self.poll_count)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> PadManager<T> {
    /// Configure the bus once and set up `pad_count` pads
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `pad_count` is not 1 or 2
    /// - `Transport` if the bus rejects the settings
    pub fn open(mut transport: T, settings: &BusSettings, pad_count: usize) -> Result<Self> {
        if pad_count == 0 || pad_count > MAX_PADS {
            return Err(PadError::InvalidArgument(format!(
                "pad count must be 1-{}, got {}",
                MAX_PADS, pad_count
            )));
        }

        transport.configure(settings)?;

        info!("Pad manager ready with {} pad(s)", pad_count);
        Ok(Self {
            transport,
            pads: vec![PadState::new(); pad_count],
            poll_count: 0,
        })
    }

    pub fn pad_count(&self) -> usize {
        self.pads.len()
    }

    /// Channels in ascending order
    pub fn channels(&self) -> impl Iterator<Item = PadChannel> {
        (0..self.pads.len() as u8).map(PadChannel::new)
    }

    /// Number of completed `poll_all` cycles
    pub fn poll_count(&self) -> u64 {
        self.poll_count
    }

    /// State of the pad on `channel`
    pub fn pad(&self, channel: PadChannel) -> Result<&PadState> {
        self.check_channel(channel)?;
        Ok(&self.pads[channel.index()])
    }

    /// Poll every pad once, in ascending channel order
    ///
    /// Each pad is sent its own poll command (motor levels included) and
    /// its reply becomes the pad's last response.
    ///
    /// # Errors
    ///
    /// Returns `Transport` on the first bus fault; remaining pads are not
    /// polled and the cycle is not counted. Any other error only skips the
    /// pad it came from: the remaining pads are still polled and the first
    /// such error is returned once the cycle is done.
    pub fn poll_all(&mut self) -> Result<()> {
        let mut first_error = None;

        for (index, pad) in self.pads.iter_mut().enumerate() {
            let channel = PadChannel::new(index as u8);
            let command = pad.poll_command;
            if let Err(e) = exchange(&mut self.transport, channel, pad, &command) {
                if e.is_fatal() {
                    return Err(e);
                }
                warn!("{}: poll skipped: {}", channel, e);
                first_error.get_or_insert(e);
            }
        }

        self.poll_count += 1;
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Decode the freshest response of the pad on `channel`
    pub fn key_state(&self, channel: PadChannel) -> Result<KeyState> {
        Ok(self.pad(channel)?.key_state())
    }

    /// Switch a pad between digital and analog reporting
    ///
    /// See [`Sequencer::set_analog_mode`].
    pub fn set_analog_mode(&mut self, channel: PadChannel, analog: bool, lock: bool) -> Result<()> {
        self.check_channel(channel)?;
        let pad = &mut self.pads[channel.index()];
        Sequencer::new(&mut self.transport, channel, pad).set_analog_mode(analog, lock)
    }

    /// Enable or disable a pad's vibration motors
    ///
    /// See [`Sequencer::set_motor_enable`].
    pub fn set_motor_enable(&mut self, channel: PadChannel, motor1: bool, motor2: bool) -> Result<()> {
        self.check_channel(channel)?;
        let pad = &mut self.pads[channel.index()];
        Sequencer::new(&mut self.transport, channel, pad).set_motor_enable(motor1, motor2)
    }

    /// Set the motor levels carried by the pad's next poll
    ///
    /// The small motor is either full on or off; the large motor takes a
    /// level 0-255. No handshake is involved, nothing is sent until the
    /// next [`poll_all`](Self::poll_all).
    pub fn set_motor_level(&mut self, channel: PadChannel, motor1_on: bool, motor2_level: u8) -> Result<()> {
        self.check_channel(channel)?;
        debug!("{}: motor levels motor1={} motor2={}", channel, motor1_on, motor2_level);
        self.pads[channel.index()].set_motor_levels(motor1_on, motor2_level);
        Ok(())
    }

    /// Give the transport back, ending the session
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn check_channel(&self, channel: PadChannel) -> Result<()> {
        if channel.index() >= self.pads.len() {
            return Err(PadError::InvalidArgument(format!(
                "channel {} out of range (configured pads: {})",
                channel.index(),
                self.pads.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::transport::mocks::RecordingTransport;
    use crate::bus::transport::MockTransport;
    use crate::protocol::command::POLL;

    const PAD0: PadChannel = PadChannel::new(0);
    const PAD1: PadChannel = PadChannel::new(1);

    fn manager(pad_count: usize) -> (PadManager<RecordingTransport>, RecordingTransport) {
        let transport = RecordingTransport::new();
        let handle = transport.clone();
        let manager = PadManager::open(transport, &BusSettings::default(), pad_count).unwrap();
        (manager, handle)
    }

    /// Mock that must never see a transfer
    fn silent_mock() -> MockTransport {
        let mut transport = MockTransport::new();
        transport.expect_configure().times(1).returning(|_| Ok(()));
        transport.expect_transfer().never();
        transport
    }

    #[test]
    fn test_open_configures_bus_once() {
        let (_manager, handle) = manager(1);
        assert_eq!(handle.configured_with(), Some(BusSettings::default()));
        assert_eq!(handle.transfer_count(), 0);
    }

    #[test]
    fn test_open_rejects_bad_pad_count() {
        for count in [0, 3] {
            let mut transport = MockTransport::new();
            transport.expect_configure().never();
            let result = PadManager::open(transport, &BusSettings::default(), count);
            assert!(matches!(result, Err(PadError::InvalidArgument(_))), "count {}", count);
        }
    }

    #[test]
    fn test_open_propagates_configure_failure() {
        let mut transport = MockTransport::new();
        transport
            .expect_configure()
            .returning(|_| Err(PadError::Transport("device busy".to_string())));
        let result = PadManager::open(transport, &BusSettings::default(), 1);
        assert!(matches!(result, Err(PadError::Transport(_))));
    }

    #[test]
    fn test_new_pads_are_default() {
        let (manager, _) = manager(2);
        assert_eq!(manager.pad_count(), 2);
        for channel in manager.channels() {
            let pad = manager.pad(channel).unwrap();
            assert_eq!(pad.poll_command(), &POLL);
            assert_eq!(manager.key_state(channel).unwrap(), KeyState::Unknown);
        }
    }

    #[test]
    fn test_poll_all_ascending_order() {
        let (mut manager, handle) = manager(2);
        handle.push_response(&[0xFF, 0x41, 0x5A, 0xFE, 0xFF]);
        handle.push_response(&[0xFF, 0x73, 0x5A, 0xFF, 0xFF, 0x80, 0x80, 0x80, 0x80]);

        manager.poll_all().unwrap();

        let frames = handle.sent_frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], (PAD0, POLL.to_vec()));
        assert_eq!(frames[1], (PAD1, POLL.to_vec()));
        assert_eq!(manager.poll_count(), 1);

        let state0 = manager.key_state(PAD0).unwrap();
        assert!(matches!(state0, KeyState::Digital { .. }));
        assert!(state0.buttons().unwrap().select);

        let state1 = manager.key_state(PAD1).unwrap();
        assert!(matches!(state1, KeyState::Analog1 { .. }));
        assert_eq!(state1.sticks().unwrap().left_x, 128);
    }

    #[test]
    fn test_poll_all_stores_full_poll_response() {
        let (mut manager, handle) = manager(1);
        let mut response = [0xFFu8; 21];
        response[1] = 0x79;
        response[2] = 0x5A;
        response[9] = 0x00;
        handle.push_response(&response);

        manager.poll_all().unwrap();

        assert_eq!(manager.pad(PAD0).unwrap().last_response(), &response);
        let state = manager.key_state(PAD0).unwrap();
        assert_eq!(state.pressures().unwrap().right, 0x00);
        assert_eq!(state.pressures().unwrap().left, 0xFF);
    }

    #[test]
    fn test_set_motor_level_carried_by_next_poll() {
        let (mut manager, handle) = manager(1);

        manager.set_motor_level(PAD0, true, 128).unwrap();
        assert_eq!(handle.transfer_count(), 0);

        let pad = manager.pad(PAD0).unwrap();
        assert_eq!(pad.poll_command()[3], 0xFF);
        assert_eq!(pad.poll_command()[4], 128);

        manager.poll_all().unwrap();
        let frames = handle.sent_frames();
        assert_eq!(frames[0].1[3], 0xFF);
        assert_eq!(frames[0].1[4], 128);
        assert_eq!(frames[0].1.len(), 21);
    }

    #[test]
    fn test_set_motor_level_only_touches_its_pad() {
        let (mut manager, _) = manager(2);
        manager.set_motor_level(PAD1, false, 42).unwrap();
        assert_eq!(manager.pad(PAD1).unwrap().motor_levels(), (0x00, 42));
        assert_eq!(manager.pad(PAD0).unwrap().poll_command(), &POLL);
    }

    #[test]
    fn test_set_analog_mode_through_manager() {
        let (mut manager, handle) = manager(2);

        manager.set_analog_mode(PAD1, true, true).unwrap();

        let frames = handle.sent_frames();
        assert_eq!(frames.len(), 5);
        assert!(frames.iter().all(|(channel, _)| *channel == PAD1));
        assert_eq!(frames[1].1[1], 0x44);
        assert_eq!(frames[1].1[3], 0x01);
        assert_eq!(frames[1].1[4], 0x03);
        assert!(manager.pad(PAD1).unwrap().analog_enabled());
        assert!(!manager.pad(PAD0).unwrap().analog_enabled());
    }

    #[test]
    fn test_set_motor_enable_through_manager() {
        let (mut manager, handle) = manager(1);
        manager.set_motor_enable(PAD0, true, false).unwrap();

        let frames = handle.sent_frames();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1].1[1], 0x4D);
        assert_eq!(frames[1].1[3], 0x00);
        assert_eq!(frames[1].1[4], 0xFF);
        assert!(manager.pad(PAD0).unwrap().motor1_enabled());
        assert!(!manager.pad(PAD0).unwrap().motor2_enabled());
    }

    #[test]
    fn test_out_of_range_channel_performs_no_transfers() {
        let mut manager = PadManager::open(silent_mock(), &BusSettings::default(), 1).unwrap();

        assert!(matches!(
            manager.set_analog_mode(PAD1, true, true),
            Err(PadError::InvalidArgument(_))
        ));
        assert!(matches!(
            manager.set_motor_enable(PAD1, true, true),
            Err(PadError::InvalidArgument(_))
        ));
        assert!(matches!(
            manager.set_motor_level(PAD1, true, 255),
            Err(PadError::InvalidArgument(_))
        ));
        assert!(matches!(manager.key_state(PAD1), Err(PadError::InvalidArgument(_))));
        assert!(matches!(manager.pad(PadChannel::new(7)), Err(PadError::InvalidArgument(_))));
    }

    #[test]
    fn test_poll_all_stops_on_transport_failure() {
        let (mut manager, handle) = manager(2);
        handle.fail_at(0);

        let result = manager.poll_all();
        assert!(matches!(result, Err(PadError::Transport(_))));
        assert!(result.unwrap_err().is_fatal());

        // Second pad was not polled, cycle not counted
        assert_eq!(handle.transfer_count(), 0);
        assert_eq!(manager.poll_count(), 0);
    }

    #[test]
    fn test_poll_all_continues_after_recoverable_error() {
        use std::sync::{Arc, Mutex};

        let polled = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&polled);

        let mut transport = MockTransport::new();
        transport.expect_configure().times(1).returning(|_| Ok(()));
        transport.expect_transfer().times(2).returning(move |channel, _tx, rx| {
            seen.lock().unwrap().push(channel.index());
            if channel == PAD0 {
                return Err(PadError::InvalidArgument("no slave select".to_string()));
            }
            rx.fill(0xFF);
            Ok(())
        });

        let mut manager = PadManager::open(transport, &BusSettings::default(), 2).unwrap();
        let result = manager.poll_all();

        assert!(matches!(result, Err(PadError::InvalidArgument(_))));
        assert_eq!(*polled.lock().unwrap(), vec![0, 1]);
        assert_eq!(manager.pad(PAD1).unwrap().last_response(), &[0xFFu8; 21]);
        assert!(manager.pad(PAD0).unwrap().last_response().is_empty());
        assert_eq!(manager.poll_count(), 1);
    }

    #[test]
    fn test_into_transport_returns_bus() {
        let (manager, handle) = manager(1);
        let transport = manager.into_transport();
        assert_eq!(transport.configured_with(), handle.configured_with());
    }
}
