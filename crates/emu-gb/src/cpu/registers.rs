//! SM83 register file.

use super::flags::{self, CARRY_BIT, HALF_CARRY_BIT, SUBTRACT_BIT, ZERO_BIT};
use crate::bits::BitExt;

/// Eight 8-bit registers, PC and SP.
///
/// F only ever holds the four flag bits; its low nibble reads as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Default for Registers {
    fn default() -> Self {
        Self {
            a: 0,
            f: 0,
            b: 0,
            c: 0,
            d: 0,
            e: 0,
            h: 0,
            l: 0,
            sp: 0xFFFE,
            pc: 0x0100,
        }
    }
}

impl Registers {
    /// Register state the DMG boot ROM leaves behind at 0x0100.
    #[must_use]
    pub fn post_boot() -> Self {
        Self {
            a: 0x01,
            f: 0xB0,
            b: 0x00,
            c: 0x13,
            d: 0x00,
            e: 0xD8,
            h: 0x01,
            l: 0x4D,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn af(&self) -> u16 {
        (self.a as u16) << 8 | self.f as u16
    }

    #[must_use]
    pub const fn bc(&self) -> u16 {
        (self.b as u16) << 8 | self.c as u16
    }

    #[must_use]
    pub const fn de(&self) -> u16 {
        (self.d as u16) << 8 | self.e as u16
    }

    #[must_use]
    pub const fn hl(&self) -> u16 {
        (self.h as u16) << 8 | self.l as u16
    }

    /// Set AF. Only the top nibble of the low byte reaches F.
    pub fn set_af(&mut self, value: u16) {
        self.a = (value >> 8) as u8;
        self.f = value as u8 & 0xF0;
    }

    pub fn set_bc(&mut self, value: u16) {
        self.b = (value >> 8) as u8;
        self.c = value as u8;
    }

    pub fn set_de(&mut self, value: u16) {
        self.d = (value >> 8) as u8;
        self.e = value as u8;
    }

    pub fn set_hl(&mut self, value: u16) {
        self.h = (value >> 8) as u8;
        self.l = value as u8;
    }

    #[must_use]
    pub fn zero(&self) -> bool {
        self.f.bit(ZERO_BIT)
    }

    #[must_use]
    pub fn subtract(&self) -> bool {
        self.f.bit(SUBTRACT_BIT)
    }

    #[must_use]
    pub fn half_carry(&self) -> bool {
        self.f.bit(HALF_CARRY_BIT)
    }

    #[must_use]
    pub fn carry(&self) -> bool {
        self.f.bit(CARRY_BIT)
    }

    /// Tri-state flag update; `None` leaves a flag untouched.
    pub fn set_flags(&mut self, z: Option<bool>, n: Option<bool>, h: Option<bool>, c: Option<bool>) {
        self.f = flags::update(self.f, z, n, h, c);
    }
}

/// 16-bit register pairs addressable by instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg16 {
    BC,
    DE,
    HL,
    SP,
    AF,
}

impl Reg16 {
    /// Decode bits 4-5 of an opcode; `stack_form` picks AF over SP for
    /// PUSH/POP.
    #[must_use]
    pub const fn from_bits(bits: u8, stack_form: bool) -> Self {
        match bits & 0x03 {
            0 => Self::BC,
            1 => Self::DE,
            2 => Self::HL,
            _ if stack_form => Self::AF,
            _ => Self::SP,
        }
    }
}

impl Registers {
    #[must_use]
    pub fn get16(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::BC => self.bc(),
            Reg16::DE => self.de(),
            Reg16::HL => self.hl(),
            Reg16::SP => self.sp,
            Reg16::AF => self.af(),
        }
    }

    pub fn set16(&mut self, reg: Reg16, value: u16) {
        match reg {
            Reg16::BC => self.set_bc(value),
            Reg16::DE => self.set_de(value),
            Reg16::HL => self.set_hl(value),
            Reg16::SP => self.sp = value,
            Reg16::AF => self.set_af(value),
        }
    }
}
