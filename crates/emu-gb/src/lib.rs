//! Machine-cycle accurate Game Boy (DMG) emulator.
//!
//! The crystal runs at 4,194,304 Hz; everything here counts machine
//! cycles (crystal / 4 = 1,048,576 Hz). A scanline is 114 machine cycles
//! and a frame is 154 scanlines = 17,556 machine cycles.
//!
//! [`GameBoy`] drives the loop: one CPU step, then the PPU catches up by
//! the cycles that step spent. All other components live on [`GbBus`].

mod bits;
mod bus;
#[cfg(feature = "native")]
pub mod capture;
pub mod cartridge;
pub mod config;
mod controller;
pub mod cpu;
pub mod error;
mod gameboy;
pub mod input;
pub mod interrupts;
pub mod memory;
pub mod ppu;
mod serial;
mod timers;

#[cfg(test)]
mod testing;

pub use bus::GbBus;
pub use config::GbConfig;
pub use controller::Controller;
pub use error::GbError;
pub use gameboy::GameBoy;
pub use input::{GbButton, InputEvent, InputQueue};
pub use ppu::FrameBuffer;
pub use serial::Serial;
pub use timers::Timers;
