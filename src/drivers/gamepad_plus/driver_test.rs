use std::collections::BTreeSet;
use std::error::Error;

use packed_struct::PackedStruct;

use crate::drivers::gamepad_plus::{
    driver::{decode, DecodeError, MIN_REPORT_SIZE, PACKET_SIZE},
    event::{AxisDirection, Button, DPad, SystemButton},
    hid_report::PackedInputDataReport,
};

/// Builds a full packet with the given leading bytes
fn packet(bytes: &[u8]) -> [u8; PACKET_SIZE] {
    let mut buf = [0; PACKET_SIZE];
    buf[..bytes.len()].copy_from_slice(bytes);
    buf
}

#[tokio::test]
async fn test_report_layout() -> Result<(), Box<dyn Error>> {
    let report = PackedInputDataReport {
        a: true,
        rb: true,
        lt_active: true,
        start: true,
        rt_analog: 0x22,
        lt_analog: 0x11,
        ..Default::default()
    };
    let buf = report.pack()?;
    assert_eq!(buf[6], 0x81, "A is bit 0 and RB is bit 7 of byte 6");
    assert_eq!(buf[7], 0x09, "LT active is bit 0 and Start is bit 3 of byte 7");
    assert_eq!(buf[8], 0x22);
    assert_eq!(buf[9], 0x11);

    Ok(())
}

#[tokio::test]
async fn test_decode_full_report() -> Result<(), Box<dyn Error>> {
    let buf = packet(&[0x01, 0x00, 0xff, 0x80, 0x40, 0x02, 0x13, 0x0e, 0xff, 0x7f]);
    let state = decode(&buf)?;
    println!("Decoded: {state:?}");

    assert_eq!(state.left_stick.x, 0x00);
    assert_eq!(state.left_stick.y, 0xff);
    assert_eq!(state.right_stick.x, 0x80);
    assert_eq!(state.right_stick.y, 0x40);
    assert_eq!(state.dpad, DPad::Right);
    assert_eq!(
        state.buttons,
        BTreeSet::from([Button::A, Button::B, Button::Y])
    );
    assert_eq!(
        state.system_buttons,
        BTreeSet::from([SystemButton::Select, SystemButton::Start, SystemButton::RT])
    );
    assert_eq!(state.right_trigger.value, 0xff);
    assert_eq!(state.left_trigger.value, 0x7f);

    Ok(())
}

#[tokio::test]
async fn test_decode_is_deterministic() -> Result<(), Box<dyn Error>> {
    for seed in 0..=255u8 {
        let mut buf = [0; PACKET_SIZE];
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = seed.wrapping_mul(31).wrapping_add((i as u8).wrapping_mul(7));
        }
        assert_eq!(decode(&buf)?, decode(&buf)?);
    }

    Ok(())
}

#[tokio::test]
async fn test_stick_boundaries() -> Result<(), Box<dyn Error>> {
    let state = decode(&packet(&[0x00, 0x80, 0x80, 0x00, 0xff, 0xff]))?;
    assert_eq!(state.left_stick.x_percent(), 0);
    assert_eq!(state.left_stick.y_percent(), 0);
    assert_eq!(state.left_stick.x_direction(), AxisDirection::Centered);
    assert_eq!(state.left_stick.y_direction(), AxisDirection::Centered);

    let expected_min = (((0.0 - 128.0) / 127.0) * 100.0_f64).round() as i32;
    assert_eq!(expected_min, -101);
    assert_eq!(state.right_stick.x_percent(), expected_min);
    assert_eq!(state.right_stick.x_direction(), AxisDirection::Negative);
    assert_eq!(state.right_stick.y_percent(), 100);
    assert_eq!(state.right_stick.y_direction(), AxisDirection::Positive);

    Ok(())
}

#[tokio::test]
async fn test_dpad_mapping() -> Result<(), Box<dyn Error>> {
    let expected = [
        (0x00, DPad::Up, "up"),
        (0x01, DPad::UpRight, "up-right"),
        (0x02, DPad::Right, "right"),
        (0x03, DPad::DownRight, "down-right"),
        (0x04, DPad::Down, "down"),
        (0x05, DPad::DownLeft, "down-left"),
        (0x06, DPad::Left, "left"),
        (0x07, DPad::UpLeft, "up-left"),
        (0xff, DPad::Center, "center"),
        (0x42, DPad::Unknown(0x42), "unknown (0x42)"),
        (0x08, DPad::Unknown(0x08), "unknown (0x08)"),
    ];
    for (code, dpad, label) in expected {
        let state = decode(&packet(&[0, 0x80, 0x80, 0x80, 0x80, code]))?;
        assert_eq!(state.dpad, dpad, "code 0x{code:02x}");
        assert_eq!(state.dpad.to_string(), label);
    }

    Ok(())
}

#[tokio::test]
async fn test_button_bitmask() -> Result<(), Box<dyn Error>> {
    let bits = [
        (0x01, Button::A),
        (0x02, Button::B),
        (0x08, Button::X),
        (0x10, Button::Y),
        (0x40, Button::LB),
        (0x80, Button::RB),
    ];
    for value in 0..=255u8 {
        let state = decode(&packet(&[0, 0x80, 0x80, 0x80, 0x80, 0xff, value]))?;
        let expected: BTreeSet<Button> = bits
            .iter()
            .filter(|(mask, _)| value & mask != 0)
            .map(|(_, button)| *button)
            .collect();
        assert_eq!(state.buttons, expected, "byte 6 = 0x{value:02x}");

        // Bits 2 and 5 never contribute
        let masked = decode(&packet(&[0, 0x80, 0x80, 0x80, 0x80, 0xff, value & !0x24]))?;
        assert_eq!(state.buttons, masked.buttons);
        assert!(state.system_buttons.is_empty());
    }

    Ok(())
}

#[tokio::test]
async fn test_system_buttons() -> Result<(), Box<dyn Error>> {
    let bits = [
        (0x01, SystemButton::LT),
        (0x02, SystemButton::RT),
        (0x04, SystemButton::Select),
        (0x08, SystemButton::Start),
    ];
    for (mask, button) in bits {
        let state = decode(&packet(&[0, 0x80, 0x80, 0x80, 0x80, 0xff, 0, mask]))?;
        assert_eq!(state.system_buttons, BTreeSet::from([button]));
        assert!(state.is_active(button));
        assert!(state.buttons.is_empty());
    }

    Ok(())
}

#[tokio::test]
async fn test_trigger_percent() -> Result<(), Box<dyn Error>> {
    let state = decode(&packet(&[0, 0x80, 0x80, 0x80, 0x80, 0xff, 0, 0, 255, 0]))?;
    assert_eq!(state.right_trigger.percent(), 100);
    assert_eq!(state.left_trigger.percent(), 0);

    // 128 / 255 = 50.19...% truncates to 50, 2 / 255 = 0.78% truncates to 0
    let state = decode(&packet(&[0, 0x80, 0x80, 0x80, 0x80, 0xff, 0, 0, 128, 2]))?;
    assert_eq!(state.right_trigger.percent(), 50);
    assert_eq!(state.left_trigger.percent(), 0);

    Ok(())
}

#[tokio::test]
async fn test_short_report_rejected() -> Result<(), Box<dyn Error>> {
    let buf = [0xffu8; MIN_REPORT_SIZE];
    for len in 0..MIN_REPORT_SIZE {
        let err = decode(&buf[..len]).expect_err("short report should not decode");
        assert_eq!(
            err,
            DecodeError::ReportTooShort {
                len,
                missing: (len..MIN_REPORT_SIZE).collect(),
            }
        );
    }

    // Exactly the minimum decodes, with the rest of the packet treated as zero
    let state = decode(&buf)?;
    assert_eq!(state.dpad, DPad::Center);

    Ok(())
}

#[tokio::test]
async fn test_oversized_report_truncated() -> Result<(), Box<dyn Error>> {
    let mut buf = vec![0u8; PACKET_SIZE + 16];
    buf[5] = 0x04;
    let state = decode(&buf)?;
    assert_eq!(state.dpad, DPad::Down);

    Ok(())
}

#[tokio::test]
async fn test_any_full_packet_decodes() -> Result<(), Box<dyn Error>> {
    let mut patterns: Vec<[u8; PACKET_SIZE]> = vec![[0x00; PACKET_SIZE], [0xff; PACKET_SIZE]];
    patterns.push(std::array::from_fn(|i| i as u8));
    patterns.push(std::array::from_fn(|i| 0xffu8.wrapping_sub(i as u8)));
    patterns.push(std::array::from_fn(|i| if i % 2 == 0 { 0xaa } else { 0x55 }));
    for byte in 0..=u8::MAX {
        patterns.push([byte; PACKET_SIZE]);
    }

    for buf in patterns {
        if let Err(e) = decode(&buf) {
            panic!("packet {buf:02x?} failed to decode: {e}");
        }
    }

    Ok(())
}
