//! Fixtures shared by unit tests.

use crate::bus::GbBus;
use crate::cartridge::{self, ROM_BANK_SIZE, header_checksum};
use crate::memory::MemoryManager;

/// Where test programs are placed and where the CPU starts.
pub const PROGRAM_START: u16 = 0x0150;

/// Build a cartridge image with a valid header.
///
/// The first byte of every switchable bank holds the bank number, the
/// entry point at 0x0100 jumps to 0x0150, and `program` sits there.
pub fn rom_image(cartridge_type: u8, rom_banks: usize, ram_code: u8, program: &[u8]) -> Vec<u8> {
    assert!(rom_banks.is_power_of_two() && rom_banks >= 2, "bank count must be 2^n");
    let mut rom = vec![0u8; rom_banks * ROM_BANK_SIZE];
    for bank in 1..rom_banks {
        rom[bank * ROM_BANK_SIZE] = bank as u8;
    }

    // NOP; JP 0x0150
    rom[0x0100..0x0104].copy_from_slice(&[0x00, 0xC3, 0x50, 0x01]);
    rom[0x0134..0x0138].copy_from_slice(b"TEST");
    rom[0x0147] = cartridge_type;
    rom[0x0148] = rom_banks.trailing_zeros() as u8 - 1;
    rom[0x0149] = ram_code;
    rom[0x014D] = header_checksum(&rom);

    let start = usize::from(PROGRAM_START);
    rom[start..start + program.len()].copy_from_slice(program);
    rom
}

/// Memory over a 32 KiB ROM-only cartridge.
pub fn memory() -> MemoryManager {
    let image = rom_image(0x00, 2, 0, &[]);
    MemoryManager::new(cartridge::from_rom(&image).expect("valid image"))
}

/// Post-boot bus with `program` at 0x0150 and PC pointing at it.
pub fn bus_with_program(program: &[u8]) -> GbBus {
    let image = rom_image(0x00, 2, 0, program);
    let mut bus = GbBus::new(cartridge::from_rom(&image).expect("valid image"));
    bus.cpu.regs.pc = PROGRAM_START;
    bus
}
