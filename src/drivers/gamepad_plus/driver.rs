use std::collections::BTreeSet;

use packed_struct::{PackedStruct, PackingError};
use thiserror::Error;

use super::{
    event::{Button, DPad, GamepadState, JoystickInput, SystemButton, TriggerInput},
    hid_report::PackedInputDataReport,
};

// Hardware ID's
pub const VID: u16 = 0x1949;
pub const PID: u16 = 0x0402;

/// Name the controller advertises over Bluetooth
pub const BLE_NAME: &str = "GamePadPlus V3";

// Input report size
pub const PACKET_SIZE: usize = 64;

/// Bytes needed to decode every control (report id through the left trigger)
pub const MIN_REPORT_SIZE: usize = 10;

/// Possible errors decoding an input report
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("input report of {len} bytes is missing offsets {missing:?}")]
    ReportTooShort { len: usize, missing: Vec<usize> },
    /// Every field of [PackedInputDataReport] is a plain integer or bool, so
    /// any 64-byte packet unpacks. This only fires if the layout gains a field
    /// with restricted values, such as a primitive enum.
    #[error("unable to unpack input report: {0}")]
    Unpack(#[from] PackingError),
}

/// Decode an input report into a [GamepadState]. Reports shorter than the
/// full packet size are zero padded; anything past the packet size is ignored.
pub fn decode(buf: &[u8]) -> Result<GamepadState, DecodeError> {
    if buf.len() < MIN_REPORT_SIZE {
        return Err(DecodeError::ReportTooShort {
            len: buf.len(),
            missing: (buf.len()..MIN_REPORT_SIZE).collect(),
        });
    }

    let mut packet = [0; PACKET_SIZE];
    let size = buf.len().min(PACKET_SIZE);
    packet[..size].copy_from_slice(&buf[..size]);
    let input_report = PackedInputDataReport::unpack(&packet)?;

    Ok(translate_state(&input_report))
}

/// Translate the packed report into a semantic snapshot
fn translate_state(report: &PackedInputDataReport) -> GamepadState {
    let mut buttons = BTreeSet::new();
    let pressed = [
        (report.a, Button::A),
        (report.b, Button::B),
        (report.x, Button::X),
        (report.y, Button::Y),
        (report.lb, Button::LB),
        (report.rb, Button::RB),
    ];
    buttons.extend(pressed.into_iter().filter(|(on, _)| *on).map(|(_, b)| b));

    let mut system_buttons = BTreeSet::new();
    let active = [
        (report.select, SystemButton::Select),
        (report.start, SystemButton::Start),
        (report.lt_active, SystemButton::LT),
        (report.rt_active, SystemButton::RT),
    ];
    system_buttons.extend(active.into_iter().filter(|(on, _)| *on).map(|(_, b)| b));

    GamepadState {
        left_stick: JoystickInput {
            x: report.joystick_l_x,
            y: report.joystick_l_y,
        },
        right_stick: JoystickInput {
            x: report.joystick_r_x,
            y: report.joystick_r_y,
        },
        dpad: DPad::from(report.dpad),
        buttons,
        system_buttons,
        left_trigger: TriggerInput {
            value: report.lt_analog,
        },
        right_trigger: TriggerInput {
            value: report.rt_analog,
        },
    }
}
