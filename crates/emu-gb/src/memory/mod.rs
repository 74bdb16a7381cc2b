//! Address map and memory-mapped register quirks.
//!
//! | Range         | Region                                   |
//! |---------------|------------------------------------------|
//! | 0x0000-0x7FFF | cartridge ROM (bank controller)          |
//! | 0x8000-0x9FFF | video RAM                                |
//! | 0xA000-0xBFFF | cartridge RAM (gated by the controller)  |
//! | 0xC000-0xDFFF | work RAM                                 |
//! | 0xE000-0xFDFF | echo of work RAM                         |
//! | 0xFE00-0xFE9F | sprite attribute memory (OAM)            |
//! | 0xFEA0-0xFEFF | unusable: reads 0, writes ignored        |
//! | 0xFF00-0xFFFF | I/O registers, high RAM, IE              |
//!
//! Side effects that involve other components (joypad readout, timer
//! reset, DMA, serial) are applied by the bus; this layer only stores
//! bytes and applies per-register masks.

mod module;

pub use module::{BankLayout, MemoryModule};

use crate::cartridge::Cartridge;

/// I/O register addresses.
pub mod io {
    pub const P1: u16 = 0xFF00;
    pub const SB: u16 = 0xFF01;
    pub const SC: u16 = 0xFF02;
    pub const DIV: u16 = 0xFF04;
    pub const TIMA: u16 = 0xFF05;
    pub const TMA: u16 = 0xFF06;
    pub const TAC: u16 = 0xFF07;
    pub const IF: u16 = 0xFF0F;
    pub const LCDC: u16 = 0xFF40;
    pub const STAT: u16 = 0xFF41;
    pub const SCY: u16 = 0xFF42;
    pub const SCX: u16 = 0xFF43;
    pub const LY: u16 = 0xFF44;
    pub const LYC: u16 = 0xFF45;
    pub const DMA: u16 = 0xFF46;
    pub const BGP: u16 = 0xFF47;
    pub const OBP0: u16 = 0xFF48;
    pub const OBP1: u16 = 0xFF49;
    pub const WY: u16 = 0xFF4A;
    pub const WX: u16 = 0xFF4B;
    pub const IE: u16 = 0xFFFF;
}

const ECHO_DISTANCE: u16 = 0x2000;

/// Register values left behind by the DMG boot ROM.
const POST_BOOT_IO: [(u16, u8); 8] = [
    (io::P1, 0xCF),
    (io::TAC, 0xF8),
    (io::IF, 0xE1),
    (io::LCDC, 0x91),
    (io::STAT, 0x85),
    (io::BGP, 0xFC),
    (io::OBP0, 0xFF),
    (io::OBP1, 0xFF),
];

/// Routes every address to its backing module.
pub struct MemoryManager {
    cartridge: Box<dyn Cartridge>,
    vram: MemoryModule,
    wram: MemoryModule,
    oam: MemoryModule,
    io: MemoryModule,
}

impl MemoryManager {
    #[must_use]
    pub fn new(cartridge: Box<dyn Cartridge>) -> Self {
        let mut memory = Self {
            cartridge,
            vram: MemoryModule::new(0x8000, 0x2000, 1, BankLayout::Single),
            wram: MemoryModule::new(0xC000, 0x2000, 1, BankLayout::Single),
            oam: MemoryModule::new(0xFE00, 0xA0, 1, BankLayout::Single),
            io: MemoryModule::new(0xFF00, 0x100, 1, BankLayout::Single),
        };
        for (address, value) in POST_BOOT_IO {
            memory.io.write(address, value);
        }
        memory
    }

    #[must_use]
    pub fn cartridge(&self) -> &dyn Cartridge {
        self.cartridge.as_ref()
    }

    pub fn cartridge_mut(&mut self) -> &mut dyn Cartridge {
        self.cartridge.as_mut()
    }

    #[must_use]
    pub fn read(&self, address: u16) -> u8 {
        match address {
            0x0000..=0x7FFF => self.cartridge.read_rom(address),
            0x8000..=0x9FFF => self.vram.read(address),
            0xA000..=0xBFFF => self.cartridge.read_ram(address),
            0xC000..=0xDFFF => self.wram.read(address),
            0xE000..=0xFDFF => self.wram.read(address - ECHO_DISTANCE),
            0xFE00..=0xFE9F => self.oam.read(address),
            0xFEA0..=0xFEFF => 0x00,
            io::P1 => self.io.read(address) | 0xC0,
            io::IF => self.io.read(address) | 0xE0,
            io::STAT => self.io.read(address) | 0x80,
            _ if unmapped_io(address) => 0xFF,
            _ => self.io.read(address),
        }
    }

    pub fn write(&mut self, address: u16, value: u8) {
        match address {
            0x0000..=0x7FFF => self.cartridge.write_control(address, value),
            0x8000..=0x9FFF => self.vram.write(address, value),
            0xA000..=0xBFFF => self.cartridge.write_ram(address, value),
            0xC000..=0xDFFF => self.wram.write(address, value),
            0xE000..=0xFDFF => self.wram.write(address - ECHO_DISTANCE, value),
            0xFE00..=0xFE9F => self.oam.write(address, value),
            0xFEA0..=0xFEFF => {}
            io::DIV | io::LY => self.io.write(address, 0),
            io::P1 => self.merge_io(address, value, 0x30),
            io::STAT => self.merge_io(address, value, 0x78),
            io::IF => self.io.write(address, value & 0x1F),
            _ if unmapped_io(address) => {}
            _ => self.io.write(address, value),
        }
    }

    /// Raw I/O read with no masks applied.
    #[must_use]
    pub fn read_io(&self, address: u16) -> u8 {
        self.io.read(address)
    }

    /// Raw I/O write that bypasses the CPU-side quirks. Used by the PPU for
    /// LY/STAT and by the timers for DIV/TIMA.
    pub fn write_io(&mut self, address: u16, value: u8) {
        self.io.write(address, value);
    }

    /// Read without side effects for the rasterizer.
    #[must_use]
    pub fn vram(&self) -> &[u8] {
        self.vram.as_bytes()
    }

    #[must_use]
    pub fn oam(&self) -> &[u8] {
        self.oam.as_bytes()
    }

    /// Fill OAM from 160 bytes of source memory.
    pub fn dma_to_oam(&mut self, page: u8) {
        let source = u16::from(page) << 8;
        for offset in 0..0xA0u16 {
            let value = self.read(source.wrapping_add(offset));
            self.oam.write(0xFE00 + offset, value);
        }
    }

    fn merge_io(&mut self, address: u16, value: u8, writable: u8) {
        let kept = self.io.read(address) & !writable;
        self.io.write(address, kept | value & writable);
    }
}

/// Addresses in the I/O page with no register behind them on this machine.
fn unmapped_io(address: u16) -> bool {
    matches!(address, 0xFF03 | 0xFF08..=0xFF0E | 0xFF10..=0xFF3F | 0xFF4C..=0xFF7F)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge;
    use crate::testing::rom_image;

    fn memory() -> MemoryManager {
        MemoryManager::new(cartridge::from_rom(&rom_image(0x03, 4, 1, &[0xAB])).expect("valid image"))
    }

    #[test]
    fn routes_rom_and_work_ram() {
        let mut memory = memory();
        assert_eq!(memory.read(0x0150), 0xAB);
        memory.write(0xC123, 0x42);
        assert_eq!(memory.read(0xC123), 0x42);
    }

    #[test]
    fn echo_region_mirrors_work_ram() {
        let mut memory = memory();
        memory.write(0xC010, 0x11);
        assert_eq!(memory.read(0xE010), 0x11);
        memory.write(0xFDFF, 0x22);
        assert_eq!(memory.read(0xDDFF), 0x22);
    }

    #[test]
    fn unusable_region_reads_zero() {
        let mut memory = memory();
        memory.write(0xFEA0, 0x33);
        assert_eq!(memory.read(0xFEA0), 0x00);
        assert_eq!(memory.read(0xFEFF), 0x00);
    }

    #[test]
    fn div_and_ly_writes_force_zero() {
        let mut memory = memory();
        memory.write_io(io::DIV, 0x12);
        memory.write_io(io::LY, 0x34);
        memory.write(io::DIV, 0xFF);
        memory.write(io::LY, 0x99);
        assert_eq!(memory.read(io::DIV), 0);
        assert_eq!(memory.read(io::LY), 0);
    }

    #[test]
    fn register_read_masks() {
        let mut memory = memory();
        memory.write(io::IF, 0x01);
        assert_eq!(memory.read(io::IF), 0xE1);

        memory.write_io(io::STAT, 0x02);
        memory.write(io::STAT, 0xFF);
        assert_eq!(memory.read(io::STAT), 0xFA, "mode bits are read-only");

        memory.write(io::P1, 0x00);
        assert_eq!(memory.read(io::P1), 0xCF);

        assert_eq!(memory.read(0xFF03), 0xFF);
    }

    #[test]
    fn post_boot_registers() {
        let memory = memory();
        assert_eq!(memory.read(io::LCDC), 0x91);
        assert_eq!(memory.read(io::BGP), 0xFC);
        assert_eq!(memory.read(io::IF), 0xE1);
    }

    #[test]
    fn high_ram_and_ie() {
        let mut memory = memory();
        memory.write(0xFF80, 0x5A);
        memory.write(io::IE, 0x1F);
        assert_eq!(memory.read(0xFF80), 0x5A);
        assert_eq!(memory.read(io::IE), 0x1F);
    }

    #[test]
    fn dma_copies_page_into_oam() {
        let mut memory = memory();
        for i in 0..0xA0u16 {
            memory.write(0xC000 + i, i as u8);
        }
        memory.dma_to_oam(0xC0);
        assert_eq!(memory.read(0xFE00), 0x00);
        assert_eq!(memory.read(0xFE9F), 0x9F);
    }
}
