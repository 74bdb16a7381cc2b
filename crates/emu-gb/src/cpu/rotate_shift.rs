//! Rotates, shifts and SWAP.
//!
//! The CB-prefixed forms set Z from the result; RLCA/RLA/RRCA/RRA always
//! clear Z. N and H are cleared by all of them.

use super::alu::AluResult;
use super::flags::{ZF, pack};
use super::{Reg8, read8, write8};
use crate::bus::GbBus;

/// Shift/rotate selected by CB opcode bits 3-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

impl ShiftOp {
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Self::Rlc,
            1 => Self::Rrc,
            2 => Self::Rl,
            3 => Self::Rr,
            4 => Self::Sla,
            5 => Self::Sra,
            6 => Self::Swap,
            _ => Self::Srl,
        }
    }
}

/// Apply `op` to `value`; `carry_in` feeds RL/RR.
#[must_use]
pub fn shift(op: ShiftOp, value: u8, carry_in: bool) -> AluResult {
    let (result, carry) = match op {
        ShiftOp::Rlc => (value.rotate_left(1), value & 0x80 != 0),
        ShiftOp::Rrc => (value.rotate_right(1), value & 0x01 != 0),
        ShiftOp::Rl => (value << 1 | u8::from(carry_in), value & 0x80 != 0),
        ShiftOp::Rr => (value >> 1 | u8::from(carry_in) << 7, value & 0x01 != 0),
        ShiftOp::Sla => (value << 1, value & 0x80 != 0),
        // Bit 7 is replicated, not shifted in from carry.
        ShiftOp::Sra => (value >> 1 | value & 0x80, value & 0x01 != 0),
        ShiftOp::Swap => (value.rotate_left(4), false),
        ShiftOp::Srl => (value >> 1, value & 0x01 != 0),
    };
    AluResult {
        value: result,
        flags: pack(result == 0, false, false, carry),
    }
}

// RLC/RRC/RL/RR/SLA/SRA/SWAP/SRL r and (HL)
pub(super) fn shift_reg(bus: &mut GbBus, op: ShiftOp, reg: Reg8) {
    let value = read8(bus, reg);
    let result = shift(op, value, bus.cpu.regs.carry());
    write8(bus, reg, result.value);
    bus.cpu.regs.f = result.flags;
}

// RLCA / RRCA / RLA / RRA
pub(super) fn shift_accumulator(bus: &mut GbBus, op: ShiftOp) {
    let regs = &mut bus.cpu.regs;
    let result = shift(op, regs.a, regs.carry());
    regs.a = result.value;
    regs.f = result.flags & !ZF;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::flags::CF;

    #[test]
    fn rotates_through_and_around_carry() {
        assert_eq!(shift(ShiftOp::Rlc, 0x85, false), AluResult { value: 0x0B, flags: CF });
        assert_eq!(shift(ShiftOp::Rl, 0x80, false), AluResult { value: 0x00, flags: ZF | CF });
        assert_eq!(shift(ShiftOp::Rl, 0x00, true).value, 0x01);
        assert_eq!(shift(ShiftOp::Rrc, 0x01, false), AluResult { value: 0x80, flags: CF });
        assert_eq!(shift(ShiftOp::Rr, 0x01, true), AluResult { value: 0x80, flags: CF });
    }

    #[test]
    fn sra_keeps_sign_bit() {
        assert_eq!(shift(ShiftOp::Sra, 0x81, false), AluResult { value: 0xC0, flags: CF });
        assert_eq!(shift(ShiftOp::Sra, 0x7F, true).value, 0x3F);
        assert_eq!(shift(ShiftOp::Srl, 0x81, false).value, 0x40);
    }

    #[test]
    fn swap_clears_carry() {
        assert_eq!(shift(ShiftOp::Swap, 0xF1, true), AluResult { value: 0x1F, flags: 0 });
        assert_eq!(shift(ShiftOp::Swap, 0x00, true).flags, ZF);
    }

    #[test]
    fn sla_to_zero() {
        assert_eq!(shift(ShiftOp::Sla, 0x80, false), AluResult { value: 0x00, flags: ZF | CF });
    }
}
