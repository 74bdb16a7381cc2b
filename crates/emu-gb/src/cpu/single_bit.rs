//! BIT, SET and RES.

use super::flags::{CF, HF, ZF};
use super::{Reg8, read8, write8};
use crate::bits::BitExt;
use crate::bus::GbBus;

// BIT b, r / BIT b, (HL)
pub(super) fn test_bit(bus: &mut GbBus, bit: u8, reg: Reg8) {
    let value = read8(bus, reg);
    let zero = if value.bit(bit) { 0 } else { ZF };
    let regs = &mut bus.cpu.regs;
    regs.f = regs.f & CF | HF | zero;
}

// SET b, r / SET b, (HL)
pub(super) fn set_bit(bus: &mut GbBus, bit: u8, reg: Reg8) {
    let value = read8(bus, reg);
    write8(bus, reg, value.set_bit(bit));
}

// RES b, r / RES b, (HL)
pub(super) fn reset_bit(bus: &mut GbBus, bit: u8, reg: Reg8) {
    let value = read8(bus, reg);
    write8(bus, reg, value.reset_bit(bit));
}
