//! Machine configuration and timing constants.

use emu_core::MasterClock;

/// DMG crystal: 4,194,304 Hz, four crystal ticks per machine cycle.
pub const CLOCK: MasterClock = MasterClock::new(4_194_304, 4);

/// Machine cycles per scanline (OAM scan + pixel transfer + `HBlank`).
pub const CYCLES_PER_LINE: u32 = 114;

/// Scanlines per frame, visible and `VBlank`.
pub const LINES_PER_FRAME: u32 = 154;

/// Machine cycles per complete video frame.
pub const CYCLES_PER_FRAME: u32 = CYCLES_PER_LINE * LINES_PER_FRAME;

/// Session configuration.
#[derive(Debug, Clone, Default)]
pub struct GbConfig {
    /// Raw cartridge image.
    pub rom_data: Vec<u8>,
    /// Battery RAM to restore, bank bytes in bank order.
    pub save_data: Option<Vec<u8>>,
}

impl GbConfig {
    #[must_use]
    pub fn new(rom_data: Vec<u8>) -> Self {
        Self {
            rom_data,
            save_data: None,
        }
    }
}
