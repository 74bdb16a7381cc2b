//! PPU timing state and the decoded LCDC/STAT view.

use crate::bus::GbBus;
use crate::memory::io;

/// LCDC (0xFF40) bits.
pub mod lcdc {
    pub const BG_ON: u8 = 0x01;
    pub const SPRITES_ON: u8 = 0x02;
    pub const TALL_SPRITES: u8 = 0x04; // 0=8x8, 1=8x16
    pub const BG_MAP_HIGH: u8 = 0x08; // 0=9800, 1=9C00
    pub const UNSIGNED_TILE_DATA: u8 = 0x10; // 0=8800 signed, 1=8000
    pub const WINDOW_ON: u8 = 0x20;
    pub const WINDOW_MAP_HIGH: u8 = 0x40;
    pub const LCD_ON: u8 = 0x80;
}

/// STAT (0xFF41) bits.
pub mod stat {
    pub const MODE_MASK: u8 = 0x03;
    pub const COINCIDENCE: u8 = 0x04;
    pub const HBLANK_SOURCE: u8 = 0x08;
    pub const VBLANK_SOURCE: u8 = 0x10;
    pub const OAM_SOURCE: u8 = 0x20;
    pub const LYC_SOURCE: u8 = 0x40;
}

/// PPU mode, numbered as STAT bits 0-1 report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    HBlank = 0,
    VBlank = 1,
    OamScan = 2,
    PixelTransfer = 3,
}

impl Mode {
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::HBlank => "HBlank",
            Self::VBlank => "VBlank",
            Self::OamScan => "OamScan",
            Self::PixelTransfer => "PixelTransfer",
        }
    }

    /// The STAT enable bit that makes this mode raise the STAT line.
    const fn stat_source(self) -> u8 {
        match self {
            Self::HBlank => stat::HBLANK_SOURCE,
            Self::VBlank => stat::VBLANK_SOURCE,
            Self::OamScan => stat::OAM_SOURCE,
            Self::PixelTransfer => 0,
        }
    }
}

/// PPU registers.
///
/// `mode`, `line_cycle` and `window_line` persist between ticks.
/// Everything else, LY included, is re-read from the bus-mapped registers
/// by [`PpuRegisters::refresh`] before the PPU acts on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PpuRegisters {
    pub mode: Mode,
    /// Machine cycles into the current scanline (0-113).
    pub line_cycle: u32,
    /// Current scanline (0-153).
    pub ly: u8,
    /// Window rows drawn so far this frame.
    pub window_line: u8,

    pub scx: u8,
    pub scy: u8,
    pub wx: u8,
    pub wy: u8,
    pub lyc: u8,
    /// STAT as last read; only the source-enable bits matter.
    pub stat: u8,
    pub bgp: u8,
    pub obp0: u8,
    pub obp1: u8,

    pub lcd_on: bool,
    pub window_on: bool,
    pub bg_on: bool,
    pub unsigned_tile_data: bool,
    pub bg_map_high: bool,
    pub window_map_high: bool,
    pub tall_sprites: bool,
    pub sprites_on: bool,
}

impl PpuRegisters {
    #[must_use]
    pub fn new() -> Self {
        Self {
            mode: Mode::OamScan,
            line_cycle: 0,
            ly: 0,
            window_line: 0,
            scx: 0,
            scy: 0,
            wx: 0,
            wy: 0,
            lyc: 0,
            stat: 0,
            bgp: 0,
            obp0: 0,
            obp1: 0,
            lcd_on: false,
            window_on: false,
            bg_on: false,
            unsigned_tile_data: false,
            bg_map_high: false,
            window_map_high: false,
            tall_sprites: false,
            sprites_on: false,
        }
    }

    /// Re-derive the decoded fields from the bus registers.
    pub fn refresh(&mut self, bus: &GbBus) {
        let memory = &bus.memory;
        let control = memory.read_io(io::LCDC);
        self.lcd_on = control & lcdc::LCD_ON != 0;
        self.window_on = control & lcdc::WINDOW_ON != 0;
        self.bg_on = control & lcdc::BG_ON != 0;
        self.unsigned_tile_data = control & lcdc::UNSIGNED_TILE_DATA != 0;
        self.bg_map_high = control & lcdc::BG_MAP_HIGH != 0;
        self.window_map_high = control & lcdc::WINDOW_MAP_HIGH != 0;
        self.tall_sprites = control & lcdc::TALL_SPRITES != 0;
        self.sprites_on = control & lcdc::SPRITES_ON != 0;

        self.ly = memory.read_io(io::LY);
        self.scx = memory.read_io(io::SCX);
        self.scy = memory.read_io(io::SCY);
        self.wx = memory.read_io(io::WX);
        self.wy = memory.read_io(io::WY);
        self.lyc = memory.read_io(io::LYC);
        self.stat = memory.read_io(io::STAT);
        self.bgp = memory.read_io(io::BGP);
        self.obp0 = memory.read_io(io::OBP0);
        self.obp1 = memory.read_io(io::OBP1);
    }

    #[must_use]
    pub fn coincidence(&self) -> bool {
        self.ly == self.lyc
    }

    /// Level of the STAT interrupt line: any enabled source active.
    #[must_use]
    pub fn stat_line(&self) -> bool {
        let mode_source = self.stat & self.mode.stat_source() != 0;
        let lyc_source = self.stat & stat::LYC_SOURCE != 0 && self.coincidence();
        mode_source || lyc_source
    }

    /// STAT as the CPU should read it: enables kept, mode and LY=LYC
    /// filled in.
    #[must_use]
    pub fn stat_value(&self) -> u8 {
        let coincidence = if self.coincidence() { stat::COINCIDENCE } else { 0 };
        self.stat & !(stat::MODE_MASK | stat::COINCIDENCE) | coincidence | self.mode.bits()
    }
}

impl Default for PpuRegisters {
    fn default() -> Self {
        Self::new()
    }
}
