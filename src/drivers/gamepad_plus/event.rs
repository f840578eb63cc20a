use std::{collections::BTreeSet, fmt};

/// Neutral value of every stick axis
pub const AXIS_CENTER: u8 = 0x80;

/// Which side of center an axis currently sits on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AxisDirection {
    /// Left on the X axis, up on the Y axis
    Negative,
    #[default]
    Centered,
    /// Right on the X axis, down on the Y axis
    Positive,
}

impl AxisDirection {
    pub fn from_value(value: u8) -> Self {
        match value.cmp(&AXIS_CENTER) {
            std::cmp::Ordering::Less => Self::Negative,
            std::cmp::Ordering::Equal => Self::Centered,
            std::cmp::Ordering::Greater => Self::Positive,
        }
    }
}

/// Converts a raw axis value into a signed percentage of deflection. The
/// negative extreme overshoots to -101 since the range below center is one
/// step wider than the range above it.
pub fn axis_percent(value: u8) -> i32 {
    let offset = value as f64 - AXIS_CENTER as f64;
    ((offset / 127.0) * 100.0).round() as i32
}

/// Axis input contain (x, y) coordinates in the device's native range
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoystickInput {
    pub x: u8,
    pub y: u8,
}

impl JoystickInput {
    pub fn x_percent(&self) -> i32 {
        axis_percent(self.x)
    }

    pub fn y_percent(&self) -> i32 {
        axis_percent(self.y)
    }

    pub fn x_direction(&self) -> AxisDirection {
        AxisDirection::from_value(self.x)
    }

    pub fn y_direction(&self) -> AxisDirection {
        AxisDirection::from_value(self.y)
    }
}

/// Trigger input contains a linear magnitude with no offset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TriggerInput {
    pub value: u8,
}

impl TriggerInput {
    /// Percentage of full travel, truncated toward zero
    pub fn percent(&self) -> u8 {
        (self.value as u32 * 100 / u8::MAX as u32) as u8
    }
}

/// Eight-way directional pad state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DPad {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
    #[default]
    Center,
    /// A code outside of the documented range, kept verbatim
    Unknown(u8),
}

impl From<u8> for DPad {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::Up,
            0x01 => Self::UpRight,
            0x02 => Self::Right,
            0x03 => Self::DownRight,
            0x04 => Self::Down,
            0x05 => Self::DownLeft,
            0x06 => Self::Left,
            0x07 => Self::UpLeft,
            0xff => Self::Center,
            code => Self::Unknown(code),
        }
    }
}

impl fmt::Display for DPad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DPad::Up => write!(f, "up"),
            DPad::UpRight => write!(f, "up-right"),
            DPad::Right => write!(f, "right"),
            DPad::DownRight => write!(f, "down-right"),
            DPad::Down => write!(f, "down"),
            DPad::DownLeft => write!(f, "down-left"),
            DPad::Left => write!(f, "left"),
            DPad::UpLeft => write!(f, "up-left"),
            DPad::Center => write!(f, "center"),
            DPad::Unknown(code) => write!(f, "unknown (0x{code:02x})"),
        }
    }
}

/// Primary face and shoulder buttons
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Button {
    A,
    B,
    X,
    Y,
    LB,
    RB,
}

impl Button {
    pub const ALL: [Button; 6] = [
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
        Button::LB,
        Button::RB,
    ];
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Menu buttons and the digital "active" flags of the analog triggers
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SystemButton {
    Select,
    Start,
    LT,
    RT,
}

impl SystemButton {
    pub const ALL: [SystemButton; 4] = [
        SystemButton::Select,
        SystemButton::Start,
        SystemButton::LT,
        SystemButton::RT,
    ];
}

impl fmt::Display for SystemButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Snapshot of every control decoded from a single input report
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GamepadState {
    pub left_stick: JoystickInput,
    pub right_stick: JoystickInput,
    pub dpad: DPad,
    pub buttons: BTreeSet<Button>,
    pub system_buttons: BTreeSet<SystemButton>,
    pub left_trigger: TriggerInput,
    pub right_trigger: TriggerInput,
}

impl GamepadState {
    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons.contains(&button)
    }

    pub fn is_active(&self, button: SystemButton) -> bool {
        self.system_buttons.contains(&button)
    }
}
