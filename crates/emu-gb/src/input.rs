//! Input handling.
//!
//! Two layers:
//! 1. `GbButton` maps logical button names to joypad bit positions.
//! 2. `InputQueue` holds frame-timed button events for scripted sequences.

use std::collections::VecDeque;

use crate::bus::GbBus;
use crate::controller;

/// Logical button on the handheld.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GbButton {
    A,
    B,
    Select,
    Start,
    Right,
    Left,
    Up,
    Down,
}

impl GbButton {
    pub const ALL: [Self; 8] = [
        Self::A,
        Self::B,
        Self::Select,
        Self::Start,
        Self::Right,
        Self::Left,
        Self::Up,
        Self::Down,
    ];

    /// Bit position in the joypad byte.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::A => controller::button::A,
            Self::B => controller::button::B,
            Self::Select => controller::button::SELECT,
            Self::Start => controller::button::START,
            Self::Right => controller::button::RIGHT,
            Self::Left => controller::button::LEFT,
            Self::Up => controller::button::UP,
            Self::Down => controller::button::DOWN,
        }
    }

    /// Parse a button name as used on the command line.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let button = match name.to_ascii_lowercase().as_str() {
            "a" => Self::A,
            "b" => Self::B,
            "select" => Self::Select,
            "start" => Self::Start,
            "right" => Self::Right,
            "left" => Self::Left,
            "up" => Self::Up,
            "down" => Self::Down,
            _ => return None,
        };
        Some(button)
    }
}

/// A timed button event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    /// Frame at which this event fires.
    pub frame: u64,
    pub button: GbButton,
    /// True = press, false = release.
    pub pressed: bool,
}

/// Timed input queue, sorted by frame and drained at the start of each
/// frame.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event after any others for the same frame.
    pub fn push(&mut self, event: InputEvent) {
        let pos = self
            .events
            .iter()
            .position(|e| e.frame > event.frame)
            .unwrap_or(self.events.len());
        self.events.insert(pos, event);
    }

    /// Press `button` at `at_frame` and release it `hold_frames` later.
    pub fn enqueue_button(&mut self, button: GbButton, at_frame: u64, hold_frames: u64) {
        self.push(InputEvent {
            frame: at_frame,
            button,
            pressed: true,
        });
        self.push(InputEvent {
            frame: at_frame + hold_frames,
            button,
            pressed: false,
        });
    }

    /// Apply every event due at or before `frame`.
    pub fn process(&mut self, frame: u64, bus: &mut GbBus) {
        while self.events.front().is_some_and(|e| e.frame <= frame) {
            if let Some(event) = self.events.pop_front() {
                bus.set_button(event.button, event.pressed);
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
