use packed_struct::prelude::*;

/// Input report as read from the USB/Bluetooth HID interface
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "64")]
pub struct PackedInputDataReport {
    // byte 0
    #[packed_field(bytes = "0")]
    pub report_id: u8,

    // byte 1-4
    #[packed_field(bytes = "1")]
    pub joystick_l_x: u8,
    #[packed_field(bytes = "2")]
    pub joystick_l_y: u8,
    #[packed_field(bytes = "3")]
    pub joystick_r_x: u8,
    #[packed_field(bytes = "4")]
    pub joystick_r_y: u8,

    // byte 5
    // Kept as a raw code so that undocumented values survive unpacking
    #[packed_field(bytes = "5")]
    pub dpad: u8,

    // byte 6
    #[packed_field(bits = "48")]
    pub rb: bool,
    #[packed_field(bits = "49")]
    pub lb: bool,
    #[packed_field(bits = "51")]
    pub y: bool,
    #[packed_field(bits = "52")]
    pub x: bool,
    #[packed_field(bits = "54")]
    pub b: bool,
    #[packed_field(bits = "55")]
    pub a: bool,

    // byte 7
    #[packed_field(bits = "60")]
    pub start: bool,
    #[packed_field(bits = "61")]
    pub select: bool,
    #[packed_field(bits = "62")]
    pub rt_active: bool,
    #[packed_field(bits = "63")]
    pub lt_active: bool,

    // byte 8-9
    #[packed_field(bytes = "8")]
    pub rt_analog: u8,
    #[packed_field(bytes = "9")]
    pub lt_analog: u8,
}
