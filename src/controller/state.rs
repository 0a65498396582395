//! # Controller State
//!
//! Immutable snapshot produced by one successful poll.
//!
//! ## Buttons
//!
//! | Flag | Frame byte | Mask |
//! |------|------------|------|
//! | select | 0 | 0x01 |
//! | right_stick_click | 0 | 0x02 |
//! | left_stick_click | 0 | 0x04 |
//! | start | 0 | 0x08 |
//! | up / right / down / left | 0 | 0x10 / 0x20 / 0x40 / 0x80 |
//! | left_trigger (L2) | 1 | 0x01 |
//! | right_trigger (R2) | 1 | 0x02 |
//! | left_bumper (L1) | 1 | 0x04 |
//! | right_bumper (R1) | 1 | 0x08 |
//! | triangle / circle / cross / square | 1 | 0x10 / 0x20 / 0x40 / 0x80 |
//!
//! ## Axes
//!
//! Signed, centered at 0, range -128..=127 (`i8`).

use serde::Serialize;

/// The 16 digital buttons of a DualShock-style pad
///
/// `true` means pressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Buttons {
    // Face buttons
    pub cross: bool,
    pub circle: bool,
    pub square: bool,
    pub triangle: bool,

    // Shoulder buttons
    /// L1
    pub left_bumper: bool,
    /// R1
    pub right_bumper: bool,
    /// L2
    pub left_trigger: bool,
    /// R2
    pub right_trigger: bool,

    // System buttons
    pub select: bool,
    pub start: bool,

    // Stick clicks
    /// L3
    pub left_stick_click: bool,
    /// R3
    pub right_stick_click: bool,

    // D-Pad
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Buttons {
    /// All flags in a fixed order (face, shoulder, system, stick, d-pad)
    #[must_use]
    pub const fn as_array(&self) -> [bool; 16] {
        [
            self.cross,
            self.circle,
            self.square,
            self.triangle,
            self.left_bumper,
            self.right_bumper,
            self.left_trigger,
            self.right_trigger,
            self.select,
            self.start,
            self.left_stick_click,
            self.right_stick_click,
            self.up,
            self.down,
            self.left,
            self.right,
        ]
    }

    /// Number of buttons currently pressed
    #[must_use]
    pub fn pressed_count(&self) -> usize {
        self.as_array().iter().filter(|&&pressed| pressed).count()
    }

    /// Checks if any button is currently pressed.
    ///
    /// # Examples
    ///
    /// ```
    /// use psx_pad::controller::state::Buttons;
    ///
    /// let mut buttons = Buttons::default();
    /// assert!(!buttons.any_pressed());
    ///
    /// buttons.start = true;
    /// assert!(buttons.any_pressed());
    /// ```
    #[must_use]
    pub fn any_pressed(&self) -> bool {
        self.pressed_count() > 0
    }
}

/// Decoded controller status
///
/// Built only by the frame decoder from a frame that passed the handshake.
/// Fields are private; the snapshot cannot change after it is returned.
/// There is no public constructor and no `Default`:
///
/// ```compile_fail
/// use psx_pad::controller::ControllerState;
///
/// let state = ControllerState::default();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControllerState {
    buttons: Buttons,
    left_stick_x: i8,
    left_stick_y: i8,
    right_stick_x: i8,
    right_stick_y: i8,
}

impl ControllerState {
    pub(crate) const fn new(
        buttons: Buttons,
        left_stick_x: i8,
        left_stick_y: i8,
        right_stick_x: i8,
        right_stick_y: i8,
    ) -> Self {
        Self {
            buttons,
            left_stick_x,
            left_stick_y,
            right_stick_x,
            right_stick_y,
        }
    }

    #[must_use]
    pub const fn buttons(&self) -> Buttons {
        self.buttons
    }

    /// Left stick X axis. Negative = left.
    #[must_use]
    pub const fn left_stick_x(&self) -> i8 {
        self.left_stick_x
    }

    /// Left stick Y axis. Negative = up.
    #[must_use]
    pub const fn left_stick_y(&self) -> i8 {
        self.left_stick_y
    }

    /// Right stick X axis. Negative = left.
    #[must_use]
    pub const fn right_stick_x(&self) -> i8 {
        self.right_stick_x
    }

    /// Right stick Y axis. Negative = up.
    #[must_use]
    pub const fn right_stick_y(&self) -> i8 {
        self.right_stick_y
    }

    /// Centered sticks, nothing pressed
    #[cfg(test)]
    pub(crate) fn neutral() -> Self {
        Self::new(Buttons::default(), 0, 0, 0, 0)
    }
}
