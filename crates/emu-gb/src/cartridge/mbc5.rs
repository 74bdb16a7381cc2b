//! MBC5: 9-bit ROM bank, 4-bit RAM bank.
//!
//! Unlike MBC1/MBC3, bank 0 can be mapped into the switchable window.

use super::{Banks, Cartridge, CartridgeHeader};

pub struct Mbc5 {
    header: CartridgeHeader,
    banks: Banks,
    rom_bank: u16,
}

impl Mbc5 {
    #[must_use]
    pub fn new(header: CartridgeHeader, image: &[u8]) -> Self {
        let banks = Banks::new(&header, image);
        Self {
            header,
            banks,
            rom_bank: 1,
        }
    }

    #[must_use]
    pub fn rom_bank(&self) -> usize {
        self.banks.rom.active_bank()
    }

    fn select_rom_bank(&mut self, bank: u16) {
        self.rom_bank = bank & 0x1FF;
        self.banks.rom.set_active_bank(usize::from(self.rom_bank));
        log::trace!("MBC5 ROM bank {}", self.banks.rom.active_bank());
    }
}

impl Cartridge for Mbc5 {
    fn read_rom(&self, address: u16) -> u8 {
        self.banks.read_rom(address)
    }

    fn write_control(&mut self, address: u16, value: u8) {
        match address {
            0x0000..=0x1FFF => self.banks.latch_ram_enable(value),
            0x2000..=0x2FFF => self.select_rom_bank(self.rom_bank & 0x100 | u16::from(value)),
            0x3000..=0x3FFF => self.select_rom_bank(u16::from(value & 1) << 8 | self.rom_bank & 0xFF),
            0x4000..=0x5FFF => self.banks.ram.set_active_bank(usize::from(value & 0x0F)),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::rom_image;

    #[test]
    fn bank_zero_is_selectable() {
        let image = rom_image(0x19, 8, 0, &[]);
        let header = CartridgeHeader::parse(&image).expect("valid header");
        let mut mbc = Mbc5::new(header, &image);
        assert_eq!(mbc.rom_bank(), 1);
        mbc.write_control(0x2000, 0x00);
        assert_eq!(mbc.rom_bank(), 0);
        assert_eq!(mbc.read_rom(0x4000), mbc.read_rom(0x0000));
    }

    #[test]
    fn ninth_bank_bit() {
        let image = rom_image(0x19, 512, 0, &[]);
        let header = CartridgeHeader::parse(&image).expect("valid header");
        let mut mbc = Mbc5::new(header, &image);
        mbc.write_control(0x2000, 0x05);
        mbc.write_control(0x3000, 0x01);
        assert_eq!(mbc.rom_bank(), 0x105);
        mbc.write_control(0x2000, 0x10);
        assert_eq!(mbc.rom_bank(), 0x110);
    }
}
