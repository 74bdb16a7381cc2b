//! 8-bit loads.

use super::{Reg8, read8, write8};
use crate::bus::GbBus;

/// Base of the I/O page used by LDH and LD (C).
const IO_PAGE: u16 = 0xFF00;

/// Indirect address forms that move a byte to or from A.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indirect {
    Bc,
    De,
    /// (HL), then HL += 1.
    HlIncrement,
    /// (HL), then HL -= 1.
    HlDecrement,
    /// (0xFF00 + C).
    HighC,
}

fn indirect_address(bus: &mut GbBus, mode: Indirect) -> u16 {
    let regs = &mut bus.cpu.regs;
    match mode {
        Indirect::Bc => regs.bc(),
        Indirect::De => regs.de(),
        Indirect::HlIncrement => {
            let hl = regs.hl();
            regs.set_hl(hl.wrapping_add(1));
            hl
        }
        Indirect::HlDecrement => {
            let hl = regs.hl();
            regs.set_hl(hl.wrapping_sub(1));
            hl
        }
        Indirect::HighC => IO_PAGE | u16::from(regs.c),
    }
}

// LD r, r' / LD r, (HL) / LD (HL), r
pub(super) fn load(bus: &mut GbBus, dst: Reg8, src: Reg8) {
    let value = read8(bus, src);
    write8(bus, dst, value);
}

// LD r, n / LD (HL), n
pub(super) fn load_immediate(bus: &mut GbBus, dst: Reg8) {
    let value = bus.fetch8();
    write8(bus, dst, value);
}

// LD A, (BC) / (DE) / (HL+) / (HL-) / (C)
pub(super) fn load_a_indirect(bus: &mut GbBus, mode: Indirect) {
    let address = indirect_address(bus, mode);
    bus.cpu.regs.a = bus.cycle_read(address);
}

// LD (BC) / (DE) / (HL+) / (HL-) / (C), A
pub(super) fn store_a_indirect(bus: &mut GbBus, mode: Indirect) {
    let address = indirect_address(bus, mode);
    bus.cycle_write(address, bus.cpu.regs.a);
}

// LDH A, (n)
pub(super) fn load_a_high(bus: &mut GbBus) {
    let offset = bus.fetch8();
    bus.cpu.regs.a = bus.cycle_read(IO_PAGE | u16::from(offset));
}

// LDH (n), A
pub(super) fn store_a_high(bus: &mut GbBus) {
    let offset = bus.fetch8();
    bus.cycle_write(IO_PAGE | u16::from(offset), bus.cpu.regs.a);
}

// LD A, (nn)
pub(super) fn load_a_absolute(bus: &mut GbBus) {
    let address = bus.fetch_nn();
    bus.cpu.regs.a = bus.cycle_read(address);
}

// LD (nn), A
pub(super) fn store_a_absolute(bus: &mut GbBus) {
    let address = bus.fetch_nn();
    bus.cycle_write(address, bus.cpu.regs.a);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::bus_with_program;

    #[test]
    fn hl_increment_and_decrement_wrap() {
        let mut bus = bus_with_program(&[]);
        bus.cpu.regs.a = 0x5A;
        bus.cpu.regs.set_hl(0xFFFF);
        store_a_indirect(&mut bus, Indirect::HlIncrement);
        assert_eq!(bus.cpu.regs.hl(), 0x0000);
        assert_eq!(bus.read(0xFFFF), 0x5A);

        bus.cpu.regs.set_hl(0xC000);
        load_a_indirect(&mut bus, Indirect::HlDecrement);
        assert_eq!(bus.cpu.regs.hl(), 0xBFFF);
    }

    #[test]
    fn high_page_addressing() {
        let mut bus = bus_with_program(&[0x80]);
        bus.cpu.regs.a = 0x77;
        store_a_high(&mut bus);
        assert_eq!(bus.read(0xFF80), 0x77);

        bus.cpu.regs.c = 0x80;
        bus.cpu.regs.a = 0;
        load_a_indirect(&mut bus, Indirect::HighC);
        assert_eq!(bus.cpu.regs.a, 0x77);
    }
}
