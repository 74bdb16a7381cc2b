//! Arithmetic and logic on the SM83.
//!
//! Pure functions: inputs in, value and complete flags byte out. The
//! executing code decides which incoming flags survive.

use super::flags::{CF, HF, NF, ZF, pack};
use super::{Reg16, Reg8, read8, write8};
use crate::bus::GbBus;

/// Result of an ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: u8,
}

fn zero(value: u8) -> u8 {
    if value == 0 { ZF } else { 0 }
}

/// ADD/ADC.
#[must_use]
pub fn add8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let wide = u16::from(a) + u16::from(b) + u16::from(c);
    let value = wide as u8;
    let half = (a & 0x0F) + (b & 0x0F) + c > 0x0F;
    AluResult {
        value,
        flags: pack(value == 0, false, half, wide > 0xFF),
    }
}

/// SUB/SBC/CP.
#[must_use]
pub fn sub8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let value = a.wrapping_sub(b).wrapping_sub(c);
    let half = (a & 0x0F) < (b & 0x0F) + c;
    let borrow = u16::from(a) < u16::from(b) + u16::from(c);
    AluResult {
        value,
        flags: pack(value == 0, true, half, borrow),
    }
}

#[must_use]
pub fn and8(a: u8, b: u8) -> AluResult {
    let value = a & b;
    AluResult {
        value,
        flags: zero(value) | HF,
    }
}

#[must_use]
pub fn or8(a: u8, b: u8) -> AluResult {
    let value = a | b;
    AluResult { value, flags: zero(value) }
}

#[must_use]
pub fn xor8(a: u8, b: u8) -> AluResult {
    let value = a ^ b;
    AluResult { value, flags: zero(value) }
}

/// INC r. Carry is preserved from `f`.
#[must_use]
pub fn inc8(value: u8, f: u8) -> AluResult {
    let result = value.wrapping_add(1);
    AluResult {
        value: result,
        flags: pack(result == 0, false, value & 0x0F == 0x0F, f & CF != 0),
    }
}

/// DEC r. Carry is preserved from `f`.
#[must_use]
pub fn dec8(value: u8, f: u8) -> AluResult {
    let result = value.wrapping_sub(1);
    AluResult {
        value: result,
        flags: pack(result == 0, true, value & 0x0F == 0, f & CF != 0),
    }
}

/// ADD HL,rr. Zero is preserved from `f`; half-carry comes out of bit 11.
#[must_use]
pub fn add16(hl: u16, operand: u16, f: u8) -> (u16, u8) {
    let (value, carry) = hl.overflowing_add(operand);
    let half = (hl & 0x0FFF) + (operand & 0x0FFF) > 0x0FFF;
    (value, pack(f & ZF != 0, false, half, carry))
}

/// SP plus a signed offset, as ADD SP,e and LD HL,SP+e compute it. Flags
/// come from the unsigned low-byte addition; Z and N are cleared.
#[must_use]
pub fn add_sp(sp: u16, offset: i8) -> (u16, u8) {
    let unsigned = offset as u8;
    let value = sp.wrapping_add_signed(i16::from(offset));
    let half = (sp & 0x000F) + u16::from(unsigned & 0x0F) > 0x000F;
    let carry = (sp & 0x00FF) + u16::from(unsigned) > 0x00FF;
    (value, pack(false, false, half, carry))
}

/// Decimal-adjust A after a BCD add or subtract.
#[must_use]
pub fn daa(a: u8, f: u8) -> AluResult {
    let subtract = f & NF != 0;
    let half = f & HF != 0;
    let mut carry = f & CF != 0;
    let mut value = a;

    if subtract {
        if carry {
            value = value.wrapping_sub(0x60);
        }
        if half {
            value = value.wrapping_sub(0x06);
        }
    } else {
        if carry || a > 0x99 {
            value = value.wrapping_add(0x60);
            carry = true;
        }
        if half || a & 0x0F > 0x09 {
            value = value.wrapping_add(0x06);
        }
    }

    AluResult {
        value,
        flags: pack(value == 0, subtract, false, carry),
    }
}

/// CPL: complement A, set N and H.
#[must_use]
pub fn cpl(a: u8, f: u8) -> AluResult {
    AluResult {
        value: !a,
        flags: f & (ZF | CF) | NF | HF,
    }
}

/// The eight accumulator operations in opcode bits 3-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Self::Add,
            1 => Self::Adc,
            2 => Self::Sub,
            3 => Self::Sbc,
            4 => Self::And,
            5 => Self::Xor,
            6 => Self::Or,
            _ => Self::Cp,
        }
    }
}

/// `op` on A with `operand`.
pub(super) fn accumulate(bus: &mut GbBus, op: AluOp, operand: u8) {
    let regs = &mut bus.cpu.regs;
    let a = regs.a;
    let carry = regs.carry();
    let result = match op {
        AluOp::Add => add8(a, operand, false),
        AluOp::Adc => add8(a, operand, carry),
        AluOp::Sub | AluOp::Cp => sub8(a, operand, false),
        AluOp::Sbc => sub8(a, operand, carry),
        AluOp::And => and8(a, operand),
        AluOp::Xor => xor8(a, operand),
        AluOp::Or => or8(a, operand),
    };
    if op != AluOp::Cp {
        regs.a = result.value;
    }
    regs.f = result.flags;
}

// ALU A, r / ALU A, (HL)
pub(super) fn accumulate_reg(bus: &mut GbBus, op: AluOp, src: Reg8) {
    let operand = read8(bus, src);
    accumulate(bus, op, operand);
}

// ALU A, n
pub(super) fn accumulate_immediate(bus: &mut GbBus, op: AluOp) {
    let operand = bus.fetch8();
    accumulate(bus, op, operand);
}

// INC r / INC (HL)
pub(super) fn inc_reg(bus: &mut GbBus, reg: Reg8) {
    let value = read8(bus, reg);
    let result = inc8(value, bus.cpu.regs.f);
    write8(bus, reg, result.value);
    bus.cpu.regs.f = result.flags;
}

// DEC r / DEC (HL)
pub(super) fn dec_reg(bus: &mut GbBus, reg: Reg8) {
    let value = read8(bus, reg);
    let result = dec8(value, bus.cpu.regs.f);
    write8(bus, reg, result.value);
    bus.cpu.regs.f = result.flags;
}

// INC rr
pub(super) fn inc_pair(bus: &mut GbBus, reg: Reg16) {
    let value = bus.cpu.regs.get16(reg).wrapping_add(1);
    bus.cpu.regs.set16(reg, value);
    bus.idle();
}

// DEC rr
pub(super) fn dec_pair(bus: &mut GbBus, reg: Reg16) {
    let value = bus.cpu.regs.get16(reg).wrapping_sub(1);
    bus.cpu.regs.set16(reg, value);
    bus.idle();
}

// ADD HL, rr
pub(super) fn add_hl(bus: &mut GbBus, reg: Reg16) {
    let regs = &mut bus.cpu.regs;
    let (value, flags) = add16(regs.hl(), regs.get16(reg), regs.f);
    regs.set_hl(value);
    regs.f = flags;
    bus.idle();
}

// ADD SP, e
pub(super) fn add_sp_offset(bus: &mut GbBus) {
    let offset = bus.fetch8() as i8;
    let (value, flags) = add_sp(bus.cpu.regs.sp, offset);
    bus.cpu.regs.sp = value;
    bus.cpu.regs.f = flags;
    bus.idle();
    bus.idle();
}

// DAA
pub(super) fn decimal_adjust(bus: &mut GbBus) {
    let regs = &mut bus.cpu.regs;
    let result = daa(regs.a, regs.f);
    regs.a = result.value;
    regs.f = result.flags;
}

// CPL
pub(super) fn complement(bus: &mut GbBus) {
    let regs = &mut bus.cpu.regs;
    let result = cpl(regs.a, regs.f);
    regs.a = result.value;
    regs.f = result.flags;
}
