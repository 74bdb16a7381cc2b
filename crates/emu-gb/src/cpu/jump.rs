//! Jumps, calls, returns and restarts.
//!
//! Conditional forms only spend the extra internal cycle when taken.

use super::Condition;
use crate::bus::GbBus;

fn taken(bus: &GbBus, condition: Option<Condition>) -> bool {
    condition.is_none_or(|c| c.holds(&bus.cpu.regs))
}

// JP nn / JP cc, nn
pub(super) fn jump_absolute(bus: &mut GbBus, condition: Option<Condition>) {
    let target = bus.fetch_nn();
    if taken(bus, condition) {
        bus.idle();
        bus.cpu.regs.pc = target;
    }
}

// JP HL
pub(super) fn jump_hl(bus: &mut GbBus) {
    bus.cpu.regs.pc = bus.cpu.regs.hl();
}

// JR e / JR cc, e
pub(super) fn jump_relative(bus: &mut GbBus, condition: Option<Condition>) {
    let offset = bus.fetch8() as i8;
    if taken(bus, condition) {
        bus.idle();
        let pc = bus.cpu.regs.pc;
        bus.cpu.regs.pc = pc.wrapping_add_signed(i16::from(offset));
    }
}

// CALL nn / CALL cc, nn
pub(super) fn call(bus: &mut GbBus, condition: Option<Condition>) {
    let target = bus.fetch_nn();
    if taken(bus, condition) {
        bus.idle();
        bus.push_pc();
        bus.cpu.regs.pc = target;
    }
}

// RET
pub(super) fn ret(bus: &mut GbBus) {
    let target = bus.pop16();
    bus.idle();
    bus.cpu.regs.pc = target;
}

// RET cc
pub(super) fn ret_conditional(bus: &mut GbBus, condition: Condition) {
    bus.idle();
    if condition.holds(&bus.cpu.regs) {
        ret(bus);
    }
}

// RETI
pub(super) fn reti(bus: &mut GbBus) {
    ret(bus);
    bus.interrupts.enable_now();
}

// RST n
pub(super) fn restart(bus: &mut GbBus, vector: u16) {
    bus.idle();
    bus.push_pc();
    bus.cpu.regs.pc = vector;
}
