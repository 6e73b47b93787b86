//! # Pad Command Catalog
//!
//! Byte-exact templates for every command the host sends. Byte 0 is the
//! pad address, byte 1 the opcode, the rest is opcode specific. Templates
//! are `const` and never edited; pads keep their own working copies of the
//! commands that carry per-pad parameters.

/// Address byte that opens every command frame
pub const PAD_ADDRESS: u8 = 0x01;

/// Poll buttons and axes; bytes 3-4 carry the motor levels
pub const OPCODE_POLL: u8 = 0x42;

/// Enter or exit a config session (byte 3 selects which)
pub const OPCODE_CONFIG: u8 = 0x43;

/// Set digital/analog mode and lock
pub const OPCODE_SET_MODE: u8 = 0x44;

/// Initialize pressure sensitive buttons
pub const OPCODE_INIT_PRESSURE: u8 = 0x40;

/// Map motor bytes of the poll command to the motors
pub const OPCODE_ENABLE_MOTORS: u8 = 0x4D;

/// Select which response bytes are reported (all pressures)
pub const OPCODE_ALL_PRESSURE: u8 = 0x4F;

/// Poll frame length: header (3) + 18 data bytes
pub const POLL_LEN: usize = 21;

/// Length of every config session command
pub const CONFIG_LEN: usize = 9;

/// Largest frame exchanged with a pad
pub const MAX_COMMAND_LEN: usize = POLL_LEN;

/// Offset of the small motor level in the poll command
pub const POLL_MOTOR1_OFFSET: usize = 3;

/// Offset of the large motor level in the poll command
pub const POLL_MOTOR2_OFFSET: usize = 4;

/// Offset of the analog flag in the set-mode command
pub const SET_MODE_ANALOG_OFFSET: usize = 3;

/// Offset of the lock flag in the set-mode command
pub const SET_MODE_LOCK_OFFSET: usize = 4;

/// Offset of the motor 1 mapping in the enable-motors command
pub const ENABLE_MOTOR1_OFFSET: usize = 3;

/// Offset of the motor 2 mapping in the enable-motors command
pub const ENABLE_MOTOR2_OFFSET: usize = 4;

/// Set-mode value selecting analog reporting
pub const MODE_ANALOG: u8 = 0x01;
/// Set-mode value selecting digital reporting
pub const MODE_DIGITAL: u8 = 0x00;
/// Set-mode value locking the mode button on the pad
pub const MODE_LOCKED: u8 = 0x03;
/// Set-mode value leaving the mode button usable
pub const MODE_UNLOCKED: u8 = 0x00;

/// Enable-motors value mapping motor 1 to poll byte 3
pub const MOTOR1_MAPPED: u8 = 0x00;
/// Enable-motors value mapping motor 2 to poll byte 4
pub const MOTOR2_MAPPED: u8 = 0x01;
/// Enable-motors value leaving a motor unmapped
pub const MOTOR_UNMAPPED: u8 = 0xFF;

pub const POLL: [u8; POLL_LEN] = [
    PAD_ADDRESS, OPCODE_POLL, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

pub const ENTER_CONFIG: [u8; CONFIG_LEN] =
    [PAD_ADDRESS, OPCODE_CONFIG, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00];

pub const EXIT_CONFIG: [u8; CONFIG_LEN] =
    [PAD_ADDRESS, OPCODE_CONFIG, 0x00, 0x00, 0x5A, 0x5A, 0x5A, 0x5A, 0x5A];

pub const SET_MODE: [u8; CONFIG_LEN] =
    [PAD_ADDRESS, OPCODE_SET_MODE, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00];

pub const INIT_PRESSURE: [u8; CONFIG_LEN] =
    [PAD_ADDRESS, OPCODE_INIT_PRESSURE, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00];

pub const ALL_PRESSURE: [u8; CONFIG_LEN] =
    [PAD_ADDRESS, OPCODE_ALL_PRESSURE, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x00, 0x00];

pub const ENABLE_MOTORS: [u8; CONFIG_LEN] =
    [PAD_ADDRESS, OPCODE_ENABLE_MOTORS, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];

/// Named commands, used for logging handshake steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Poll,
    EnterConfig,
    ExitConfig,
    SetMode,
    InitPressure,
    AllPressure,
    EnableMotors,
}

impl CommandKind {
    /// All commands in catalog order
    pub const ALL: [CommandKind; 7] = [
        CommandKind::Poll,
        CommandKind::EnterConfig,
        CommandKind::ExitConfig,
        CommandKind::SetMode,
        CommandKind::InitPressure,
        CommandKind::AllPressure,
        CommandKind::EnableMotors,
    ];

    /// Shared template bytes for this command
    pub fn template(self) -> &'static [u8] {
        match self {
            CommandKind::Poll => &POLL,
            CommandKind::EnterConfig => &ENTER_CONFIG,
            CommandKind::ExitConfig => &EXIT_CONFIG,
            CommandKind::SetMode => &SET_MODE,
            CommandKind::InitPressure => &INIT_PRESSURE,
            CommandKind::AllPressure => &ALL_PRESSURE,
            CommandKind::EnableMotors => &ENABLE_MOTORS,
        }
    }

    /// Frame length; a response is always the same length
    pub fn frame_len(self) -> usize {
        self.template().len()
    }

    pub fn opcode(self) -> u8 {
        self.template()[1]
    }

    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Poll => "poll",
            CommandKind::EnterConfig => "enter-config",
            CommandKind::ExitConfig => "exit-config",
            CommandKind::SetMode => "set-mode",
            CommandKind::InitPressure => "init-pressure",
            CommandKind::AllPressure => "all-pressure",
            CommandKind::EnableMotors => "enable-motors",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
