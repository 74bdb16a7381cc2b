//! Opcode dispatch.
//!
//! The unprefixed table is irregular enough to spell out, except for the
//! LD r,r' block (0x40-0x7F) and the ALU block (0x80-0xBF), which decode
//! their operands from the opcode bits. The CB table is fully regular.

use super::alu::{self, AluOp};
use super::load8::{self, Indirect};
use super::rotate_shift::{self, ShiftOp};
use super::{Condition, Reg8, Reg16, control, jump, load16, single_bit};
use crate::bus::GbBus;
use crate::error::GbError;

/// Execute `opcode`, already fetched from `pc`.
pub(super) fn execute(bus: &mut GbBus, opcode: u8, pc: u16) -> Result<(), GbError> {
    let op = opcode;
    match op {
        // NOP
        0x00 => {}

        // LD rr, nn
        0x01 | 0x11 | 0x21 | 0x31 => load16::load_pair_immediate(bus, Reg16::from_bits(op >> 4, false)),

        // LD (BC), A
        0x02 => load8::store_a_indirect(bus, Indirect::Bc),
        // LD (DE), A
        0x12 => load8::store_a_indirect(bus, Indirect::De),
        // LD (HL+), A
        0x22 => load8::store_a_indirect(bus, Indirect::HlIncrement),
        // LD (HL-), A
        0x32 => load8::store_a_indirect(bus, Indirect::HlDecrement),

        // INC rr
        0x03 | 0x13 | 0x23 | 0x33 => alu::inc_pair(bus, Reg16::from_bits(op >> 4, false)),
        // DEC rr
        0x0B | 0x1B | 0x2B | 0x3B => alu::dec_pair(bus, Reg16::from_bits(op >> 4, false)),

        // INC r
        0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => alu::inc_reg(bus, Reg8::from_bits(op >> 3)),
        // DEC r
        0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => alu::dec_reg(bus, Reg8::from_bits(op >> 3)),
        // LD r, n
        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => load8::load_immediate(bus, Reg8::from_bits(op >> 3)),

        // RLCA
        0x07 => rotate_shift::shift_accumulator(bus, ShiftOp::Rlc),
        // RRCA
        0x0F => rotate_shift::shift_accumulator(bus, ShiftOp::Rrc),
        // RLA
        0x17 => rotate_shift::shift_accumulator(bus, ShiftOp::Rl),
        // RRA
        0x1F => rotate_shift::shift_accumulator(bus, ShiftOp::Rr),

        // LD (nn), SP
        0x08 => load16::store_sp_absolute(bus),

        // ADD HL, rr
        0x09 | 0x19 | 0x29 | 0x39 => alu::add_hl(bus, Reg16::from_bits(op >> 4, false)),

        // LD A, (BC)
        0x0A => load8::load_a_indirect(bus, Indirect::Bc),
        // LD A, (DE)
        0x1A => load8::load_a_indirect(bus, Indirect::De),
        // LD A, (HL+)
        0x2A => load8::load_a_indirect(bus, Indirect::HlIncrement),
        // LD A, (HL-)
        0x3A => load8::load_a_indirect(bus, Indirect::HlDecrement),

        // STOP
        0x10 => control::stop(bus),

        // JR e
        0x18 => jump::jump_relative(bus, None),
        // JR cc, e
        0x20 | 0x28 | 0x30 | 0x38 => jump::jump_relative(bus, Some(Condition::from_bits(op >> 3))),

        // DAA
        0x27 => alu::decimal_adjust(bus),
        // CPL
        0x2F => alu::complement(bus),
        // SCF
        0x37 => control::set_carry(bus),
        // CCF
        0x3F => control::complement_carry(bus),

        // HALT
        0x76 => control::halt(bus),

        // LD r, r' / LD r, (HL) / LD (HL), r
        0x40..=0x7F => load8::load(bus, Reg8::from_bits(op >> 3), Reg8::from_bits(op)),

        // ADD/ADC/SUB/SBC/AND/XOR/OR/CP A, r
        0x80..=0xBF => alu::accumulate_reg(bus, AluOp::from_bits(op >> 3), Reg8::from_bits(op)),

        // RET cc
        0xC0 | 0xC8 | 0xD0 | 0xD8 => jump::ret_conditional(bus, Condition::from_bits(op >> 3)),
        // RET
        0xC9 => jump::ret(bus),
        // RETI
        0xD9 => jump::reti(bus),

        // POP rr
        0xC1 | 0xD1 | 0xE1 | 0xF1 => load16::pop(bus, Reg16::from_bits(op >> 4, true)),
        // PUSH rr
        0xC5 | 0xD5 | 0xE5 | 0xF5 => load16::push(bus, Reg16::from_bits(op >> 4, true)),

        // JP cc, nn
        0xC2 | 0xCA | 0xD2 | 0xDA => jump::jump_absolute(bus, Some(Condition::from_bits(op >> 3))),
        // JP nn
        0xC3 => jump::jump_absolute(bus, None),
        // JP HL
        0xE9 => jump::jump_hl(bus),

        // CALL cc, nn
        0xC4 | 0xCC | 0xD4 | 0xDC => jump::call(bus, Some(Condition::from_bits(op >> 3))),
        // CALL nn
        0xCD => jump::call(bus, None),

        // ADD/ADC/SUB/SBC/AND/XOR/OR/CP A, n
        0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
            alu::accumulate_immediate(bus, AluOp::from_bits(op >> 3));
        }

        // RST n
        0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => jump::restart(bus, u16::from(op & 0x38)),

        // CB prefix
        0xCB => {
            let cb = bus.fetch8();
            execute_cb(bus, cb);
        }

        // LDH (n), A
        0xE0 => load8::store_a_high(bus),
        // LDH A, (n)
        0xF0 => load8::load_a_high(bus),
        // LD (C), A
        0xE2 => load8::store_a_indirect(bus, Indirect::HighC),
        // LD A, (C)
        0xF2 => load8::load_a_indirect(bus, Indirect::HighC),
        // LD (nn), A
        0xEA => load8::store_a_absolute(bus),
        // LD A, (nn)
        0xFA => load8::load_a_absolute(bus),

        // ADD SP, e
        0xE8 => alu::add_sp_offset(bus),
        // LD HL, SP+e
        0xF8 => load16::load_hl_sp_offset(bus),
        // LD SP, HL
        0xF9 => load16::load_sp_hl(bus),

        // DI
        0xF3 => control::schedule_interrupts(bus, false),
        // EI
        0xFB => control::schedule_interrupts(bus, true),

        // D3 DB DD E3 E4 EB EC ED F4 FC FD
        _ => return Err(GbError::IllegalOpcode { opcode, pc }),
    }
    Ok(())
}

/// CB-prefixed table: shifts in 0x00-0x3F, then BIT, RES and SET.
fn execute_cb(bus: &mut GbBus, op: u8) {
    let reg = Reg8::from_bits(op);
    let bit = (op >> 3) & 0x07;
    match op {
        0x00..=0x3F => rotate_shift::shift_reg(bus, ShiftOp::from_bits(op >> 3), reg),
        0x40..=0x7F => single_bit::test_bit(bus, bit, reg),
        0x80..=0xBF => single_bit::reset_bit(bus, bit, reg),
        0xC0..=0xFF => single_bit::set_bit(bus, bit, reg),
    }
}
