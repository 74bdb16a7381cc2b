//! Cartridges without a bank controller.

use super::{Banks, Cartridge, CartridgeHeader};

/// 32 KiB of ROM mapped directly, plus optional RAM that is always enabled.
/// Control writes are ignored.
pub struct RomOnly {
    header: CartridgeHeader,
    banks: Banks,
}

impl RomOnly {
    #[must_use]
    pub fn new(header: CartridgeHeader, image: &[u8]) -> Self {
        let mut banks = Banks::new(&header, image);
        banks.ram_enabled = true;
        Self { header, banks }
    }
}

impl Cartridge for RomOnly {
    fn read_rom(&self, address: u16) -> u8 {
        self.banks.read_rom(address)
    }

    fn write_control(&mut self, _address: u16, _value: u8) {}

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
    fn control_writes_do_not_bank() {
        let image = rom_image(0x00, 2, 0, &[]);
        let header = CartridgeHeader::parse(&image).expect("valid header");
        let mut cartridge = RomOnly::new(header, &image);
        let before = cartridge.read_rom(0x4000);
        cartridge.write_control(0x2000, 0x05);
        assert_eq!(cartridge.read_rom(0x4000), before);
        assert_eq!(cartridge.read_rom(0x4000), 1);
    }
}
