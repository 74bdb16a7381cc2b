//! 16-bit loads and the stack.

use super::Reg16;
use super::alu;
use crate::bus::GbBus;

// LD rr, nn
pub(super) fn load_pair_immediate(bus: &mut GbBus, reg: Reg16) {
    let value = bus.fetch_nn();
    bus.cpu.regs.set16(reg, value);
}

// LD (nn), SP
pub(super) fn store_sp_absolute(bus: &mut GbBus) {
    let address = bus.fetch_nn();
    let [low, high] = bus.cpu.regs.sp.to_le_bytes();
    bus.cycle_write(address, low);
    bus.cycle_write(address.wrapping_add(1), high);
}

// LD SP, HL
pub(super) fn load_sp_hl(bus: &mut GbBus) {
    bus.cpu.regs.sp = bus.cpu.regs.hl();
    bus.idle();
}

// LD HL, SP+e
pub(super) fn load_hl_sp_offset(bus: &mut GbBus) {
    let offset = bus.fetch8() as i8;
    let (value, flags) = alu::add_sp(bus.cpu.regs.sp, offset);
    bus.cpu.regs.set_hl(value);
    bus.cpu.regs.f = flags;
    bus.idle();
}

// PUSH rr
pub(super) fn push(bus: &mut GbBus, reg: Reg16) {
    let value = bus.cpu.regs.get16(reg);
    bus.idle();
    bus.push16(value);
}

// POP rr
pub(super) fn pop(bus: &mut GbBus, reg: Reg16) {
    let value = bus.pop16();
    bus.cpu.regs.set16(reg, value);
}
