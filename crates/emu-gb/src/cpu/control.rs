//! NOP, flag control, HALT, STOP, DI and EI.

use super::flags::{CF, ZF};
use crate::bus::GbBus;
use crate::memory::io;

// CCF
pub(super) fn complement_carry(bus: &mut GbBus) {
    let regs = &mut bus.cpu.regs;
    regs.f = regs.f & ZF | (regs.f ^ CF) & CF;
}

// SCF
pub(super) fn set_carry(bus: &mut GbBus) {
    let regs = &mut bus.cpu.regs;
    regs.f = regs.f & ZF | CF;
}

// HALT
pub(super) fn halt(bus: &mut GbBus) {
    bus.cpu.halted = true;
    let cycle = bus.cycles();
    bus.interrupts.record_halt(cycle);
}

// STOP: swallow the padding byte, reset DIV, wait for a button.
pub(super) fn stop(bus: &mut GbBus) {
    bus.cpu.regs.pc = bus.cpu.regs.pc.wrapping_add(1);
    bus.write(io::DIV, 0);
    bus.cpu.stopped = true;
    log::debug!("STOP at {:#06X}", bus.cpu.regs.pc.wrapping_sub(2));
}

// DI / EI
pub(super) fn schedule_interrupts(bus: &mut GbBus, enable: bool) {
    bus.interrupts.schedule_ime(enable);
}
