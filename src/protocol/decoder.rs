//! # Key State Decoder
//!
//! Turns a raw poll response into a [`KeyState`].
//!
//! ## Response Layout
//!
//! | Offset | Content |
//! |--------|---------|
//! | 0 | Idle (0xFF) |
//! | 1 | Device id: high nibble = mode, low nibble = 16-bit data words |
//! | 2 | Ready marker (0x5A) |
//! | 3 | Select, L3, R3, Start, Up, Right, Down, Left (bit 0..7) |
//! | 4 | L2, R2, L1, R1, Triangle, Circle, Cross, Square (bit 0..7) |
//! | 5-8 | Right X, Right Y, Left X, Left Y |
//! | 9-20 | Pressures: Right, Left, Up, Down, Triangle, Circle, Cross, Square, L1, R1, L2, R2 |
//!
//! Button bits are active-low: a cleared bit means pressed.
//!
//! Higher modes report a superset of the lower ones at the same offsets, so
//! decoding runs tier by tier: pressure mode fills the pressures and then
//! everything analog mode fills, which in turn fills the digital buttons.

use tracing::warn;

/// Device id reported in digital mode
pub const DEVICE_ID_DIGITAL: u8 = 0x41;
/// Device id reported in analog mode
pub const DEVICE_ID_ANALOG: u8 = 0x73;
/// Device id reported in analog mode with pressure sensitive buttons
pub const DEVICE_ID_PRESSURE: u8 = 0x79;
/// Device id reported while inside a config session
pub const DEVICE_ID_CONFIG: u8 = 0xF3;
/// Line idles high when nothing answers
pub const DEVICE_ID_NOT_PRESENT: u8 = 0xFF;

/// Offset of the device id in every response
pub const DEVICE_ID_OFFSET: usize = 1;

/// Number of header bytes before the data words
pub const RESPONSE_HEADER_LEN: usize = 3;

const BUTTONS_LOW_OFFSET: usize = 3;
const BUTTONS_HIGH_OFFSET: usize = 4;
const AXES_OFFSET: usize = 5;
const PRESSURES_OFFSET: usize = 9;

// Byte 3 masks
const MASK_SELECT: u8 = 0x01;
const MASK_L3: u8 = 0x02;
const MASK_R3: u8 = 0x04;
const MASK_START: u8 = 0x08;
const MASK_UP: u8 = 0x10;
const MASK_RIGHT: u8 = 0x20;
const MASK_DOWN: u8 = 0x40;
const MASK_LEFT: u8 = 0x80;

// Byte 4 masks
const MASK_L2: u8 = 0x01;
const MASK_R2: u8 = 0x02;
const MASK_L1: u8 = 0x04;
const MASK_R1: u8 = 0x08;
const MASK_TRIANGLE: u8 = 0x10;
const MASK_CIRCLE: u8 = 0x20;
const MASK_CROSS: u8 = 0x40;
const MASK_SQUARE: u8 = 0x80;

/// Reporting mode a pad announces through its device id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMode {
    Digital,
    Analog,
    Pressure,
    /// Pad is inside a config session
    Config,
    /// No pad answered on this channel
    NotPresent,
    Other(u8),
}

impl DeviceMode {
    pub fn from_id(id: u8) -> Self {
        match id {
            DEVICE_ID_DIGITAL => DeviceMode::Digital,
            DEVICE_ID_ANALOG => DeviceMode::Analog,
            DEVICE_ID_PRESSURE => DeviceMode::Pressure,
            DEVICE_ID_CONFIG => DeviceMode::Config,
            DEVICE_ID_NOT_PRESENT => DeviceMode::NotPresent,
            other => DeviceMode::Other(other),
        }
    }

    /// Classify a raw response by its device id byte
    pub fn of_response(response: &[u8]) -> Self {
        match response.get(DEVICE_ID_OFFSET) {
            Some(&id) => Self::from_id(id),
            None => DeviceMode::NotPresent,
        }
    }
}

/// Total response length announced by a device id
///
/// The low nibble counts 16-bit data words following the 3-byte header.
pub fn announced_len(device_id: u8) -> usize {
    RESPONSE_HEADER_LEN + 2 * (device_id & 0x0F) as usize
}

/// Active-low decode of one button bit: cleared means pressed
pub fn is_pressed(byte: u8, mask: u8) -> bool {
    byte & mask == 0
}

/// Digital buttons, `true` = pressed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigitalButtons {
    pub select: bool,
    pub start: bool,
    pub up: bool,
    pub right: bool,
    pub down: bool,
    pub left: bool,
    pub l2: bool,
    pub r2: bool,
    pub l1: bool,
    pub r1: bool,
    pub triangle: bool,
    pub circle: bool,
    pub cross: bool,
    pub square: bool,
}

impl DigitalButtons {
    fn decode(low: u8, high: u8) -> Self {
        Self {
            select: is_pressed(low, MASK_SELECT),
            start: is_pressed(low, MASK_START),
            up: is_pressed(low, MASK_UP),
            right: is_pressed(low, MASK_RIGHT),
            down: is_pressed(low, MASK_DOWN),
            left: is_pressed(low, MASK_LEFT),
            l2: is_pressed(high, MASK_L2),
            r2: is_pressed(high, MASK_R2),
            l1: is_pressed(high, MASK_L1),
            r1: is_pressed(high, MASK_R1),
            triangle: is_pressed(high, MASK_TRIANGLE),
            circle: is_pressed(high, MASK_CIRCLE),
            cross: is_pressed(high, MASK_CROSS),
            square: is_pressed(high, MASK_SQUARE),
        }
    }

    /// Iterate `(name, pressed)` over every button
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> {
        [
            ("select", self.select),
            ("start", self.start),
            ("up", self.up),
            ("right", self.right),
            ("down", self.down),
            ("left", self.left),
            ("l2", self.l2),
            ("r2", self.r2),
            ("l1", self.l1),
            ("r1", self.r1),
            ("triangle", self.triangle),
            ("circle", self.circle),
            ("cross", self.cross),
            ("square", self.square),
        ]
        .into_iter()
    }
}

/// Stick axes and stick clicks reported in analog mode
///
/// Axes are raw 0-255 with center near 128.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalogSticks {
    pub l3: bool,
    pub r3: bool,
    pub right_x: u8,
    pub right_y: u8,
    pub left_x: u8,
    pub left_y: u8,
}

impl AnalogSticks {
    fn decode(response: &[u8]) -> Self {
        let low = response[BUTTONS_LOW_OFFSET];
        Self {
            l3: is_pressed(low, MASK_L3),
            r3: is_pressed(low, MASK_R3),
            right_x: response[AXES_OFFSET],
            right_y: response[AXES_OFFSET + 1],
            left_x: response[AXES_OFFSET + 2],
            left_y: response[AXES_OFFSET + 3],
        }
    }
}

/// Pressure levels, passed through as reported (0xFF released, 0x00 fully pressed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pressures {
    pub right: u8,
    pub left: u8,
    pub up: u8,
    pub down: u8,
    pub triangle: u8,
    pub circle: u8,
    pub cross: u8,
    pub square: u8,
    pub l1: u8,
    pub r1: u8,
    pub l2: u8,
    pub r2: u8,
}

impl Pressures {
    fn decode(response: &[u8]) -> Self {
        let p = &response[PRESSURES_OFFSET..PRESSURES_OFFSET + 12];
        Self {
            right: p[0],
            left: p[1],
            up: p[2],
            down: p[3],
            triangle: p[4],
            circle: p[5],
            cross: p[6],
            square: p[7],
            l1: p[8],
            r1: p[9],
            l2: p[10],
            r2: p[11],
        }
    }
}

/// Input snapshot of one pad, tagged by reporting mode
///
/// Each variant carries everything the lower ones do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Unknown,
    Digital {
        buttons: DigitalButtons,
    },
    Analog1 {
        buttons: DigitalButtons,
        sticks: AnalogSticks,
    },
    Analog2 {
        buttons: DigitalButtons,
        sticks: AnalogSticks,
        pressures: Pressures,
    },
}

impl KeyState {
    pub fn buttons(&self) -> Option<&DigitalButtons> {
        match self {
            KeyState::Unknown => None,
            KeyState::Digital { buttons }
            | KeyState::Analog1 { buttons, .. }
            | KeyState::Analog2 { buttons, .. } => Some(buttons),
        }
    }

    pub fn sticks(&self) -> Option<&AnalogSticks> {
        match self {
            KeyState::Analog1 { sticks, .. } | KeyState::Analog2 { sticks, .. } => Some(sticks),
            _ => None,
        }
    }

    pub fn pressures(&self) -> Option<&Pressures> {
        match self {
            KeyState::Analog2 { pressures, .. } => Some(pressures),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, KeyState::Unknown)
    }
}

/// Reporting tiers, ordered by capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    Digital,
    Analog1,
    Analog2,
}

impl Tier {
    fn from_id(id: u8) -> Option<Self> {
        match id {
            DEVICE_ID_DIGITAL => Some(Tier::Digital),
            DEVICE_ID_ANALOG => Some(Tier::Analog1),
            DEVICE_ID_PRESSURE => Some(Tier::Analog2),
            _ => None,
        }
    }
}

/// Decode a poll response into a key state
///
/// Pure function of `response`. Device ids other than digital, analog and
/// pressure mode yield [`KeyState::Unknown`], as does a buffer shorter than
/// the length its device id announces. Both cases are logged as warnings,
/// except for the config-session and no-pad ids.
///
/// # Examples
///
/// ```
/// use psxpad::protocol::decoder::{decode_key_state, KeyState};
///
/// let mut response = [0u8; 21];
/// response[1] = 0x41;
/// response[3] = 0xFF;
/// response[4] = 0xBF; // Cross held
///
/// let state = decode_key_state(&response);
/// assert!(matches!(state, KeyState::Digital { .. }));
/// assert!(state.buttons().unwrap().cross);
/// ```
pub fn decode_key_state(response: &[u8]) -> KeyState {
    let Some(&device_id) = response.get(DEVICE_ID_OFFSET) else {
        return KeyState::Unknown;
    };

    let Some(tier) = Tier::from_id(device_id) else {
        if let DeviceMode::Other(id) = DeviceMode::from_id(device_id) {
            warn!("Unsupported device id 0x{:02X}", id);
        }
        return KeyState::Unknown;
    };

    let required = announced_len(device_id);
    if response.len() < required {
        warn!(
            "Response too short for device id 0x{:02X}: {} bytes, need {}",
            device_id,
            response.len(),
            required
        );
        return KeyState::Unknown;
    }

    let buttons =
        DigitalButtons::decode(response[BUTTONS_LOW_OFFSET], response[BUTTONS_HIGH_OFFSET]);

    if tier < Tier::Analog1 {
        return KeyState::Digital { buttons };
    }

    let sticks = AnalogSticks::decode(response);

    if tier < Tier::Analog2 {
        return KeyState::Analog1 { buttons, sticks };
    }

    KeyState::Analog2 {
        buttons,
        sticks,
        pressures: Pressures::decode(response),
    }
}
