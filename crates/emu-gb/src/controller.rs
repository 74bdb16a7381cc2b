//! Joypad matrix behind P1 (0xFF00).
//!
//! The eight buttons form two groups of four. P1 bit 4 = 0 selects the
//! direction keys, bit 5 = 0 selects the action keys; the low nibble then
//! reads the selected group, active low.

use crate::bits::BitExt;

/// Bit positions in the joypad byte. Directions occupy the low nibble,
/// actions the high nibble, so each group lines up with P1 bits 0-3.
pub mod button {
    pub const RIGHT: u8 = 0;
    pub const LEFT: u8 = 1;
    pub const UP: u8 = 2;
    pub const DOWN: u8 = 3;
    pub const A: u8 = 4;
    pub const B: u8 = 5;
    pub const SELECT: u8 = 6;
    pub const START: u8 = 7;
}

const SELECT_DIRECTIONS_BIT: u8 = 4;
const SELECT_ACTIONS_BIT: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controller {
    /// One bit per button, 0 = pressed.
    state: u8,
}

impl Controller {
    #[must_use]
    pub fn new() -> Self {
        Self { state: 0xFF }
    }

    /// Set a button. Returns true on a release-to-press transition.
    pub fn set_button(&mut self, button: u8, pressed: bool) -> bool {
        let was_pressed = !self.state.bit(button);
        self.state = self.state.with_bit(button, !pressed);
        pressed && !was_pressed
    }

    pub fn release_all(&mut self) {
        self.state = 0xFF;
    }

    /// P1 as the CPU sees it, given the stored select bits.
    #[must_use]
    pub fn read(&self, p1: u8) -> u8 {
        let mut low = 0x0F;
        if !p1.bit(SELECT_DIRECTIONS_BIT) {
            low &= self.state & 0x0F;
        }
        if !p1.bit(SELECT_ACTIONS_BIT) {
            low &= self.state >> 4;
        }
        0xC0 | p1 & 0x30 | low
    }

    /// Raw joypad byte (for observation).
    #[must_use]
    pub fn state(&self) -> u8 {
        self.state
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIRECTIONS: u8 = 0x20;
    const ACTIONS: u8 = 0x10;

    #[test]
    fn nothing_pressed_reads_high() {
        let controller = Controller::new();
        assert_eq!(controller.read(DIRECTIONS), 0xEF);
        assert_eq!(controller.read(ACTIONS), 0xDF);
    }

    #[test]
    fn right_toggles_only_bit_zero_of_direction_group() {
        let mut controller = Controller::new();
        assert!(controller.set_button(button::RIGHT, true));
        assert_eq!(controller.read(DIRECTIONS), 0xEF & !0x01);
        controller.set_button(button::RIGHT, false);
        assert_eq!(controller.read(DIRECTIONS), 0xEF);
    }

    #[test]
    fn directions_invisible_with_action_group_selected() {
        let mut controller = Controller::new();
        controller.set_button(button::RIGHT, true);
        assert_eq!(controller.read(ACTIONS), 0xDF);
        controller.set_button(button::START, true);
        assert_eq!(controller.read(ACTIONS), 0xDF & !0x08);
    }

    #[test]
    fn repeated_press_is_not_a_new_edge() {
        let mut controller = Controller::new();
        assert!(controller.set_button(button::A, true));
        assert!(!controller.set_button(button::A, true));
        controller.release_all();
        assert_eq!(controller.state(), 0xFF);
    }
}
