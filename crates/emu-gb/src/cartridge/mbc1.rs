//! MBC1: 5-bit low ROM bank, 2-bit upper register, mode select.
//!
//! - 0x0000-0x1FFF: RAM enable (low nibble 0xA)
//! - 0x2000-0x3FFF: ROM bank low 5 bits, 0 selects 1
//! - 0x4000-0x5FFF: upper register; ROM bank bits 5-6 in mode 0, RAM bank in mode 1
//! - 0x6000-0x7FFF: banking mode (bit 0)

use super::{Banks, Cartridge, CartridgeHeader};

pub struct Mbc1 {
    header: CartridgeHeader,
    banks: Banks,
    rom_bank_low: u8,
    upper: u8,
    ram_banking_mode: bool,
}

impl Mbc1 {
    #[must_use]
    pub fn new(header: CartridgeHeader, image: &[u8]) -> Self {
        let banks = Banks::new(&header, image);
        let mut mbc = Self {
            header,
            banks,
            rom_bank_low: 1,
            upper: 0,
            ram_banking_mode: false,
        };
        mbc.update_banks();
        mbc
    }

    /// Bank currently visible at 0x4000-0x7FFF.
    #[must_use]
    pub fn rom_bank(&self) -> usize {
        self.banks.rom.active_bank()
    }

    /// Bank currently visible at 0xA000-0xBFFF.
    #[must_use]
    pub fn ram_bank(&self) -> usize {
        self.banks.ram.active_bank()
    }

    fn update_banks(&mut self) {
        let (high, ram_bank) = if self.ram_banking_mode {
            (0, self.upper)
        } else {
            (self.upper, 0)
        };
        let selected = usize::from(high) << 5 | usize::from(self.rom_bank_low);
        let bank = (selected % self.header.rom_banks.max(1)).max(1);
        self.banks.rom.set_active_bank(bank);
        self.banks.ram.set_active_bank(usize::from(ram_bank));
        log::trace!("MBC1 ROM bank {bank}, RAM bank {ram_bank}");
    }
}

impl Cartridge for Mbc1 {
    fn read_rom(&self, address: u16) -> u8 {
        self.banks.read_rom(address)
    }

    fn write_control(&mut self, address: u16, value: u8) {
        match address {
            0x0000..=0x1FFF => self.banks.latch_ram_enable(value),
            0x2000..=0x3FFF => {
                self.rom_bank_low = (value & 0x1F).max(1);
                self.update_banks();
            }
            0x4000..=0x5FFF => {
                self.upper = value & 0x03;
                self.update_banks();
            }
            0x6000..=0x7FFF => {
                self.ram_banking_mode = value & 0x01 != 0;
                self.update_banks();
            }
            _ => {}
        }
    }

    fn read_ram(&self, address: u16) -> u8 {
        self.banks.read_ram(address)
    }

    fn write_ram(&mut self, address: u16, value: u8) {
        self.banks.write_ram(address, value);
    }

    fn ram_enabled(&self) -> bool {
        self.banks.ram_enabled
    }

    fn header(&self) -> &CartridgeHeader {
        &self.header
    }

    fn ram(&self) -> &[u8] {
        self.banks.ram.as_bytes()
    }

    fn ram_mut(&mut self) -> &mut [u8] {
        self.banks.ram.as_bytes_mut()
    }
}
