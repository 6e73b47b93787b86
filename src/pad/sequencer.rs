//! # Protocol Sequencer
//!
//! Exchanges single commands with a pad and runs the configuration
//! handshakes.
//!
//! A pad only honours configuration opcodes inside a config session, so
//! every handshake is bracketed by enter-config and exit-config and runs as
//! one uninterrupted series of transfers on its channel. The first failed
//! transfer aborts the series.

use tracing::{debug, trace};

use crate::bus::Transport;
use crate::error::{PadError, Result};
use crate::pad::state::{PadChannel, PadState};
use crate::protocol::command::{
    CommandKind, ENABLE_MOTOR1_OFFSET, ENABLE_MOTOR2_OFFSET, MAX_COMMAND_LEN, MODE_ANALOG,
    MODE_DIGITAL, MODE_LOCKED, MODE_UNLOCKED, MOTOR1_MAPPED, MOTOR2_MAPPED, MOTOR_UNMAPPED,
    SET_MODE_ANALOG_OFFSET, SET_MODE_LOCK_OFFSET,
};
use crate::protocol::frame::{reverse_in_place, reverse_into};

/// Send one command and store the reply as the pad's last response
///
/// The command is reflected into wire bit order, transferred whole, and the
/// reply reflected back before it is stored.
///
/// # Errors
///
/// - `InvalidArgument` for an empty command or one longer than the largest frame
/// - `Transport` if the bus reports a fault; `last_response` is left untouched
pub fn exchange<T: Transport + ?Sized>(
    transport: &mut T,
    channel: PadChannel,
    pad: &mut PadState,
    command: &[u8],
) -> Result<()> {
    let len = command.len();
    if len == 0 {
        return Err(PadError::InvalidArgument("command is empty".to_string()));
    }
    if len > MAX_COMMAND_LEN {
        return Err(PadError::InvalidArgument(format!(
            "command of {} bytes exceeds maximum {}",
            len, MAX_COMMAND_LEN
        )));
    }

    let mut tx = [0u8; MAX_COMMAND_LEN];
    let mut rx = [0u8; MAX_COMMAND_LEN];
    reverse_into(command, &mut tx[..len]);

    transport.transfer(channel, &tx[..len], &mut rx[..len])?;

    reverse_in_place(&mut rx[..len]);
    trace!("{} <- {:02X?}", channel, &rx[..len]);

    pad.last_response.replace(&rx[..len])
}

/// One step of a handshake: a shared template or one of the pad's working buffers
#[derive(Debug, Clone, Copy)]
enum Step {
    Template(CommandKind),
    SetMode,
    EnableMotors,
}

impl Step {
    fn kind(self) -> CommandKind {
        match self {
            Step::Template(kind) => kind,
            Step::SetMode => CommandKind::SetMode,
            Step::EnableMotors => CommandKind::EnableMotors,
        }
    }
}

const ANALOG_MODE_STEPS: [Step; 5] = [
    Step::Template(CommandKind::EnterConfig),
    Step::SetMode,
    Step::Template(CommandKind::InitPressure),
    Step::Template(CommandKind::AllPressure),
    Step::Template(CommandKind::ExitConfig),
];

const MOTOR_ENABLE_STEPS: [Step; 3] = [
    Step::Template(CommandKind::EnterConfig),
    Step::EnableMotors,
    Step::Template(CommandKind::ExitConfig),
];

/// Runs handshakes for one pad on one channel
///
/// Holds the transport and the pad exclusively for its lifetime, so nothing
/// else can reach the channel between the steps of a handshake.
pub struct Sequencer<'a, T: Transport + ?Sized> {
    transport: &'a mut T,
    channel: PadChannel,
    pad: &'a mut PadState,
}

impl<'a, T: Transport + ?Sized> Sequencer<'a, T> {
    pub fn new(transport: &'a mut T, channel: PadChannel, pad: &'a mut PadState) -> Self {
        Self {
            transport,
            channel,
            pad,
        }
    }

    /// Switch the pad between digital and analog reporting
    ///
    /// Runs enter-config, set-mode, init-pressure, all-pressure, exit-config.
    /// `lock` disables the pad's own mode button. The pad's requested flags
    /// are updated once every step went through.
    pub fn set_analog_mode(&mut self, analog: bool, lock: bool) -> Result<()> {
        self.pad.set_mode_command[SET_MODE_ANALOG_OFFSET] =
            if analog { MODE_ANALOG } else { MODE_DIGITAL };
        self.pad.set_mode_command[SET_MODE_LOCK_OFFSET] =
            if lock { MODE_LOCKED } else { MODE_UNLOCKED };

        debug!("{}: set mode analog={} lock={}", self.channel, analog, lock);
        self.run(&ANALOG_MODE_STEPS)?;

        self.pad.analog_enabled = analog;
        self.pad.lock_enabled = lock;
        Ok(())
    }

    /// Map the poll command's motor bytes to the pad's motors
    ///
    /// Runs enter-config, enable-motors, exit-config.
    pub fn set_motor_enable(&mut self, motor1: bool, motor2: bool) -> Result<()> {
        self.pad.enable_motors_command[ENABLE_MOTOR1_OFFSET] =
            if motor1 { MOTOR1_MAPPED } else { MOTOR_UNMAPPED };
        self.pad.enable_motors_command[ENABLE_MOTOR2_OFFSET] =
            if motor2 { MOTOR2_MAPPED } else { MOTOR_UNMAPPED };

        debug!("{}: enable motors motor1={} motor2={}", self.channel, motor1, motor2);
        self.run(&MOTOR_ENABLE_STEPS)?;

        self.pad.motor1_enabled = motor1;
        self.pad.motor2_enabled = motor2;
        Ok(())
    }

    fn run(&mut self, steps: &[Step]) -> Result<()> {
        for &step in steps {
            debug!("{}: {}", self.channel, step.kind());

            // Working buffers are copied out so the pad can take the reply
            let (buf, len) = match step {
                Step::Template(kind) => working_copy(kind.template()),
                Step::SetMode => working_copy(&self.pad.set_mode_command),
                Step::EnableMotors => working_copy(&self.pad.enable_motors_command),
            };

            exchange(&mut *self.transport, self.channel, &mut *self.pad, &buf[..len])?;
        }
        Ok(())
    }
}

fn working_copy(bytes: &[u8]) -> ([u8; MAX_COMMAND_LEN], usize) {
    let mut buf = [0u8; MAX_COMMAND_LEN];
    buf[..bytes.len()].copy_from_slice(bytes);
    (buf, bytes.len())
}
