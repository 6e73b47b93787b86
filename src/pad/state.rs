//! # Per-Pad State
//!
//! Working command buffers, the last response and the requested
//! configuration of one pad.

use crate::error::{PadError, Result};
use crate::protocol::command::{
    CONFIG_LEN, ENABLE_MOTORS, MAX_COMMAND_LEN, POLL, POLL_LEN, POLL_MOTOR1_OFFSET,
    POLL_MOTOR2_OFFSET, SET_MODE,
};
use crate::protocol::decoder::{decode_key_state, DeviceMode, KeyState};

/// Most pads that can share one bus
pub const MAX_PADS: usize = 2;

/// Logical slot of one pad on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PadChannel(u8);

impl PadChannel {
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for PadChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pad{}", self.0)
    }
}

/// Fixed-capacity buffer holding the bytes of the last exchange
///
/// Always replaced as a whole; its length is the length of the command
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBuffer {
    bytes: [u8; MAX_COMMAND_LEN],
    len: usize,
}

impl Default for ResponseBuffer {
    fn default() -> Self {
        Self {
            bytes: [0u8; MAX_COMMAND_LEN],
            len: 0,
        }
    }
}

impl ResponseBuffer {
    /// Replace the contents with `bytes`
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `bytes` exceeds the largest command length.
    pub fn replace(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > MAX_COMMAND_LEN {
            return Err(PadError::InvalidArgument(format!(
                "response of {} bytes exceeds maximum {}",
                bytes.len(),
                MAX_COMMAND_LEN
            )));
        }
        self.bytes[..bytes.len()].copy_from_slice(bytes);
        self.bytes[bytes.len()..].fill(0);
        self.len = bytes.len();
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// State of one pad, owned by the pad manager
#[derive(Debug, Clone)]
pub struct PadState {
    pub(crate) poll_command: [u8; POLL_LEN],
    pub(crate) set_mode_command: [u8; CONFIG_LEN],
    pub(crate) enable_motors_command: [u8; CONFIG_LEN],
    pub(crate) last_response: ResponseBuffer,
    pub(crate) analog_enabled: bool,
    pub(crate) lock_enabled: bool,
    pub(crate) motor1_enabled: bool,
    pub(crate) motor2_enabled: bool,
}

impl Default for PadState {
    fn default() -> Self {
        Self::new()
    }
}

impl PadState {
    pub fn new() -> Self {
        Self {
            poll_command: POLL,
            set_mode_command: SET_MODE,
            enable_motors_command: ENABLE_MOTORS,
            last_response: ResponseBuffer::default(),
            analog_enabled: false,
            lock_enabled: false,
            motor1_enabled: false,
            motor2_enabled: false,
        }
    }

    /// Poll command sent every cycle, motor levels included
    pub fn poll_command(&self) -> &[u8; POLL_LEN] {
        &self.poll_command
    }

    /// Bytes received by the most recent exchange
    pub fn last_response(&self) -> &[u8] {
        self.last_response.as_slice()
    }

    /// Decode the most recent response
    pub fn key_state(&self) -> KeyState {
        decode_key_state(self.last_response())
    }

    /// Mode announced by the most recent response
    pub fn device_mode(&self) -> DeviceMode {
        DeviceMode::of_response(self.last_response())
    }

    pub fn analog_enabled(&self) -> bool {
        self.analog_enabled
    }

    pub fn lock_enabled(&self) -> bool {
        self.lock_enabled
    }

    pub fn motor1_enabled(&self) -> bool {
        self.motor1_enabled
    }

    pub fn motor2_enabled(&self) -> bool {
        self.motor2_enabled
    }

    /// Motor levels carried by the next poll
    pub fn motor_levels(&self) -> (u8, u8) {
        (
            self.poll_command[POLL_MOTOR1_OFFSET],
            self.poll_command[POLL_MOTOR2_OFFSET],
        )
    }

    /// Write motor levels into the poll command
    ///
    /// The small motor only runs full on or off, the large one takes any level.
    pub(crate) fn set_motor_levels(&mut self, motor1_on: bool, motor2_level: u8) {
        self.poll_command[POLL_MOTOR1_OFFSET] = if motor1_on { 0xFF } else { 0x00 };
        self.poll_command[POLL_MOTOR2_OFFSET] = motor2_level;
    }
}
