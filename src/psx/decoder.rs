//! # PSX Frame Decoder
//!
//! Decodes the six-byte status frame into a [`ControllerState`].
//!
//! ## Pipeline
//!
//! ```text
//! wire byte ──reverse bits──► corrected byte
//!   bytes 0-1: invert (active low) ──► mask test ──► 16 button flags
//!   bytes 2-5: dead-zone ──► minus 128 ──► 4 signed axes
//! ```

use super::deadzone::apply_deadzone;
use super::protocol::*;
use crate::controller::state::{Buttons, ControllerState};

/// Correct the bit order of one sampled byte
///
/// The controller's shift register delivers bits in the opposite order to the
/// exchange primitive, so bit `i` of the result is bit `7 - i` of `raw`.
///
/// # Examples
///
/// ```
/// use psx_pad::psx::decoder::correct_bit_order;
///
/// assert_eq!(correct_bit_order(0b0000_0001), 0b1000_0000);
/// assert_eq!(correct_bit_order(0xFE), 0x7F);
/// ```
#[must_use]
pub const fn correct_bit_order(raw: u8) -> u8 {
    raw.reverse_bits()
}

/// Decode a captured frame
///
/// # Arguments
///
/// * `frame` - Raw frame from a successful handshake (consumed)
/// * `deadzone` - Dead-zone fraction applied to each axis before signed conversion
#[must_use]
pub fn decode_frame(frame: RawFrame, deadzone: f64) -> ControllerState {
    let [system, action, left_x, left_y, right_x, right_y] =
        frame.into_bytes().map(correct_bit_order);

    let buttons = decode_buttons(
        SystemButtons::from_bits_retain(!system),
        ActionButtons::from_bits_retain(!action),
    );

    ControllerState::new(
        buttons,
        signed_axis(left_x, deadzone),
        signed_axis(left_y, deadzone),
        signed_axis(right_x, deadzone),
        signed_axis(right_y, deadzone),
    )
}

/// Map pressed masks (already corrected and inverted) to named flags
#[must_use]
pub fn decode_buttons(system: SystemButtons, action: ActionButtons) -> Buttons {
    Buttons {
        cross: action.contains(ActionButtons::CROSS),
        circle: action.contains(ActionButtons::CIRCLE),
        square: action.contains(ActionButtons::SQUARE),
        triangle: action.contains(ActionButtons::TRIANGLE),
        left_bumper: action.contains(ActionButtons::L1),
        right_bumper: action.contains(ActionButtons::R1),
        left_trigger: action.contains(ActionButtons::L2),
        right_trigger: action.contains(ActionButtons::R2),
        select: system.contains(SystemButtons::SELECT),
        start: system.contains(SystemButtons::START),
        left_stick_click: system.contains(SystemButtons::JOYLEFT),
        right_stick_click: system.contains(SystemButtons::JOYRIGHT),
        up: system.contains(SystemButtons::UP),
        down: system.contains(SystemButtons::DOWN),
        left: system.contains(SystemButtons::LEFT),
        right: system.contains(SystemButtons::RIGHT),
    }
}

/// Dead-zone then center a corrected axis byte: 0..=255 → -128..=127
#[must_use]
pub fn signed_axis(corrected: u8, deadzone: f64) -> i8 {
    (i16::from(apply_deadzone(corrected, deadzone)) - i16::from(PSX_AXIS_CENTER)) as i8
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build the wire frame whose corrected bytes are `corrected`
    fn wire_frame(corrected: [u8; PSX_FRAME_LEN]) -> RawFrame {
        RawFrame::new(corrected.map(u8::reverse_bits))
    }

    /// Corrected byte pair in which only `mask` reads as pressed
    fn pressed_only(byte: usize, mask: u8) -> [u8; PSX_FRAME_LEN] {
        let mut corrected = [0xFF, 0xFF, 0x80, 0x80, 0x80, 0x80];
        corrected[byte] = !mask;
        corrected
    }

    #[test]
    fn test_bit_order_correction_is_involutive() {
        for b in 0..=u8::MAX {
            assert_eq!(correct_bit_order(correct_bit_order(b)), b);
        }
    }

    #[test]
    fn test_bit_order_correction_mirrors_bits() {
        for i in 0..8 {
            assert_eq!(correct_bit_order(1 << i), 1 << (7 - i));
        }
        assert_eq!(correct_bit_order(0x5A), 0x5A);
        assert_eq!(correct_bit_order(0x0F), 0xF0);
    }

    #[test]
    fn test_neutral_frame() {
        let state = decode_frame(wire_frame([0xFF, 0xFF, 0x80, 0x80, 0x80, 0x80]), 0.0);

        assert_eq!(state.buttons(), Buttons::default());
        assert_eq!(state.left_stick_x(), 0);
        assert_eq!(state.left_stick_y(), 0);
        assert_eq!(state.right_stick_x(), 0);
        assert_eq!(state.right_stick_y(), 0);
    }

    #[test]
    fn test_select_only() {
        let state = decode_frame(wire_frame([0xFE, 0xFF, 0x80, 0x80, 0x80, 0x80]), 0.0);
        let buttons = state.buttons();

        assert!(buttons.select);
        assert_eq!(buttons.pressed_count(), 1);
    }

    #[test]
    fn test_axis_outside_deadzone_passes_through() {
        let state = decode_frame(wire_frame([0xFF, 0xFF, 200, 0x80, 0x80, 0x80]), 0.2);
        assert_eq!(state.left_stick_x(), 72);
    }

    #[test]
    fn test_axis_inside_deadzone_is_centered() {
        let state = decode_frame(wire_frame([0xFF, 0xFF, 0x80, 150, 100, 0x80]), 0.2);
        assert_eq!(state.left_stick_y(), 0);
        assert_eq!(state.right_stick_x(), 0);
    }

    #[test]
    fn test_axis_order_and_extremes() {
        let state = decode_frame(wire_frame([0xFF, 0xFF, 0, 255, 129, 127]), 0.0);
        assert_eq!(state.left_stick_x(), -128);
        assert_eq!(state.left_stick_y(), 127);
        assert_eq!(state.right_stick_x(), 1);
        assert_eq!(state.right_stick_y(), -1);
    }

    #[test]
    fn test_axis_bytes_are_not_inverted() {
        // A wire byte of 0x01 corrects to 0x80 (center), not its complement
        let state = decode_frame(RawFrame::new([0xFF, 0xFF, 0x01, 0x01, 0x01, 0x01]), 0.0);
        assert_eq!(state.left_stick_x(), 0);
        assert_eq!(state.right_stick_y(), 0);
    }

    #[test]
    fn test_each_system_mask_sets_one_flag() {
        let expected: [(u8, fn(&Buttons) -> bool); 8] = [
            (0x01, |b| b.select),
            (0x02, |b| b.right_stick_click),
            (0x04, |b| b.left_stick_click),
            (0x08, |b| b.start),
            (0x10, |b| b.up),
            (0x20, |b| b.right),
            (0x40, |b| b.down),
            (0x80, |b| b.left),
        ];

        for (mask, flag) in expected {
            let buttons = decode_frame(wire_frame(pressed_only(0, mask)), 0.0).buttons();
            assert!(flag(&buttons), "mask 0x{:02X} did not set its flag", mask);
            assert_eq!(buttons.pressed_count(), 1, "mask 0x{:02X} set extra flags", mask);
        }
    }

    #[test]
    fn test_each_action_mask_sets_one_flag() {
        let expected: [(u8, fn(&Buttons) -> bool); 8] = [
            (0x01, |b| b.left_trigger),
            (0x02, |b| b.right_trigger),
            (0x04, |b| b.left_bumper),
            (0x08, |b| b.right_bumper),
            (0x10, |b| b.triangle),
            (0x20, |b| b.circle),
            (0x40, |b| b.cross),
            (0x80, |b| b.square),
        ];

        for (mask, flag) in expected {
            let buttons = decode_frame(wire_frame(pressed_only(1, mask)), 0.0).buttons();
            assert!(flag(&buttons), "mask 0x{:02X} did not set its flag", mask);
            assert_eq!(buttons.pressed_count(), 1, "mask 0x{:02X} set extra flags", mask);
        }
    }

    #[test]
    fn test_all_pressed() {
        let buttons = decode_frame(wire_frame([0x00, 0x00, 0x80, 0x80, 0x80, 0x80]), 0.0).buttons();
        assert_eq!(buttons.pressed_count(), 16);
    }

    #[test]
    fn test_signed_axis() {
        assert_eq!(signed_axis(0, 0.0), -128);
        assert_eq!(signed_axis(128, 0.0), 0);
        assert_eq!(signed_axis(255, 0.0), 127);
        assert_eq!(signed_axis(200, 0.2), 72);
        assert_eq!(signed_axis(178, 0.2), 0);
    }
}
