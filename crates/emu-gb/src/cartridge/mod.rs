//! Cartridge images and bank controllers.
//!
//! A [`Cartridge`] owns the ROM and external RAM banks and decides how
//! writes to 0x0000-0x7FFF change the banking state. Supported controllers:
//! none (ROM only), MBC1, MBC3 with real-time clock, and MBC5.

mod header;
mod mbc1;
mod mbc3;
mod mbc5;
mod rom_only;

pub use header::{CartridgeHeader, CgbSupport, ControllerKind, HEADER_END, header_checksum};
pub use mbc1::Mbc1;
pub use mbc3::{Mbc3, RealTimeClock};
pub use mbc5::Mbc5;
pub use rom_only::RomOnly;

use crate::error::GbError;
use crate::memory::{BankLayout, MemoryModule};

/// Size of one switchable ROM bank.
pub const ROM_BANK_SIZE: usize = 0x4000;
/// Size of one external RAM bank.
pub const RAM_BANK_SIZE: usize = 0x2000;

/// Bank controller: translates CPU accesses to cartridge ROM and RAM.
pub trait Cartridge: Send {
    /// Read from 0x0000-0x7FFF.
    fn read_rom(&self, address: u16) -> u8;
    /// Control write to 0x0000-0x7FFF.
    fn write_control(&mut self, address: u16, value: u8);
    /// Read from 0xA000-0xBFFF. Disabled or absent RAM reads 0xFF.
    fn read_ram(&self, address: u16) -> u8;
    /// Write to 0xA000-0xBFFF. Ignored while RAM is disabled.
    fn write_ram(&mut self, address: u16, value: u8);
    fn ram_enabled(&self) -> bool;
    fn header(&self) -> &CartridgeHeader;
    /// External RAM bytes, all banks in bank order.
    fn ram(&self) -> &[u8];
    fn ram_mut(&mut self) -> &mut [u8];
    /// Advance cartridge hardware by one machine cycle. Only clock chips care.
    fn tick(&mut self) {}
}

/// ROM and RAM banks shared by every controller.
#[derive(Debug, Clone)]
pub(crate) struct Banks {
    pub rom: MemoryModule,
    pub ram: MemoryModule,
    pub ram_enabled: bool,
}

impl Banks {
    pub fn new(header: &CartridgeHeader, image: &[u8]) -> Self {
        Self {
            rom: MemoryModule::from_bytes(0x0000, ROM_BANK_SIZE, header.rom_banks, BankLayout::FixedPlusSwitchable, image),
            ram: MemoryModule::new(0xA000, RAM_BANK_SIZE, header.ram_banks, BankLayout::Single),
            ram_enabled: false,
        }
    }

    pub fn read_rom(&self, address: u16) -> u8 {
        self.rom.read(address)
    }

    pub fn read_ram(&self, address: u16) -> u8 {
        if self.ram_enabled && !self.ram.is_empty() {
            self.ram.read(address)
        } else {
            0xFF
        }
    }

    pub fn write_ram(&mut self, address: u16, value: u8) {
        if self.ram_enabled && !self.ram.is_empty() {
            self.ram.write(address, value);
        }
    }

    /// RAM enable latch at 0x0000-0x1FFF: on iff the low nibble is 0xA.
    pub fn latch_ram_enable(&mut self, value: u8) {
        let enabled = value & 0x0F == 0x0A;
        if enabled != self.ram_enabled {
            log::trace!("cartridge RAM {}", if enabled { "enabled" } else { "disabled" });
        }
        self.ram_enabled = enabled;
    }
}

/// Parse `image` and build the controller its header asks for.
///
/// # Errors
///
/// Returns an error if the image is too short or its size codes are
/// unknown. An unknown cartridge type is not an error; it loads without
/// banking.
pub fn from_rom(image: &[u8]) -> Result<Box<dyn Cartridge>, GbError> {
    let header = CartridgeHeader::parse(image)?;

    if !header.checksum_ok {
        log::warn!("header checksum mismatch in \"{}\"", header.title);
    }
    if header.cgb == CgbSupport::Required {
        log::warn!("\"{}\" requires colour hardware, running in DMG mode", header.title);
    }
    let declared = header.rom_banks * ROM_BANK_SIZE;
    if image.len() < declared {
        log::warn!("ROM image is {} bytes, header declares {declared}", image.len());
    }
    log::info!(
        "loaded \"{}\": {:?}, {} ROM banks, {} RAM banks{}",
        header.title,
        header.controller,
        header.rom_banks,
        header.ram_banks,
        if header.has_battery { ", battery" } else { "" },
    );

    let cartridge: Box<dyn Cartridge> = match header.controller {
        ControllerKind::RomOnly => Box::new(RomOnly::new(header, image)),
        ControllerKind::Mbc1 => Box::new(Mbc1::new(header, image)),
        ControllerKind::Mbc3 => Box::new(Mbc3::new(header, image)),
        ControllerKind::Mbc5 => Box::new(Mbc5::new(header, image)),
    };
    Ok(cartridge)
}

/// Battery-backed RAM, if the cartridge has any.
#[must_use]
pub fn save_data(cartridge: &dyn Cartridge) -> Option<Vec<u8>> {
    let ram = cartridge.ram();
    (cartridge.header().has_battery && !ram.is_empty()).then(|| ram.to_vec())
}

/// Restore external RAM from `data`.
///
/// # Errors
///
/// Returns [`GbError::SaveDataSize`] if `data` is not exactly the size of
/// the cartridge RAM; RAM is left untouched.
pub fn load_save_data(cartridge: &mut dyn Cartridge, data: &[u8]) -> Result<(), GbError> {
    let ram = cartridge.ram_mut();
    if ram.len() != data.len() {
        return Err(GbError::SaveDataSize {
            expected: ram.len(),
            actual: data.len(),
        });
    }
    ram.copy_from_slice(data);
    Ok(())
}
