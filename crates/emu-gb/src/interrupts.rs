//! Interrupt sources, priority and the master-enable state machine.
//!
//! IE (0xFFFF) and IF (0xFF0F) are plain memory-mapped registers; this
//! module holds only what the CPU keeps internally: IME, a deferred IME
//! change left by EI/DI, and the halt-bug bookkeeping.

use crate::memory::{MemoryManager, io};

/// Interrupt sources in priority order, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    VBlank,
    Stat,
    Timer,
    Serial,
    Joypad,
}

impl Interrupt {
    pub const ALL: [Self; 5] = [Self::VBlank, Self::Stat, Self::Timer, Self::Serial, Self::Joypad];

    /// Bit in IE/IF.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::VBlank => 0,
            Self::Stat => 1,
            Self::Timer => 2,
            Self::Serial => 3,
            Self::Joypad => 4,
        }
    }

    #[must_use]
    pub const fn mask(self) -> u8 {
        1 << self.bit()
    }

    /// Dispatch address.
    #[must_use]
    pub const fn vector(self) -> u16 {
        0x0040 + 8 * self.bit() as u16
    }

    /// Highest-priority source in `pending` (an `IE & IF` value).
    #[must_use]
    pub fn highest(pending: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|source| pending & source.mask() != 0)
    }
}

/// Set `interrupt`'s IF bit. IME is not touched.
pub fn request(memory: &mut MemoryManager, interrupt: Interrupt) {
    let flags = memory.read_io(io::IF);
    memory.write_io(io::IF, flags | interrupt.mask());
}

/// `IE & IF`, restricted to the five real sources.
#[must_use]
pub fn pending(memory: &MemoryManager) -> u8 {
    memory.read_io(io::IE) & memory.read_io(io::IF) & 0x1F
}

/// An IME change scheduled by EI or DI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ImeChange {
    enable: bool,
    /// Instruction boundaries left before the change lands.
    remaining: u8,
}

/// CPU-side interrupt state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interrupts {
    /// Interrupt master enable.
    pub ime: bool,
    change: Option<ImeChange>,
    /// Set when HALT was left on the cycle it started with IME clear; the
    /// next opcode fetch does not advance PC.
    pub halt_bug: bool,
    halt_cycle: Option<u64>,
}

impl Interrupts {
    /// EI/DI: change IME after the instruction that follows this one.
    pub fn schedule_ime(&mut self, enable: bool) {
        self.change = Some(ImeChange { enable, remaining: 2 });
    }

    /// RETI: enable immediately, dropping any scheduled change.
    pub fn enable_now(&mut self) {
        self.ime = true;
        self.change = None;
    }

    /// Called after every instruction completes.
    pub fn end_of_instruction(&mut self) {
        if let Some(change) = &mut self.change {
            change.remaining -= 1;
            if change.remaining == 0 {
                self.ime = change.enable;
                self.change = None;
            }
        }
    }

    #[must_use]
    pub fn ime_change_pending(&self) -> bool {
        self.change.is_some()
    }

    /// Remember the cycle a HALT began.
    pub fn record_halt(&mut self, cycle: u64) {
        self.halt_cycle = Some(cycle);
    }

    /// A halted CPU saw a pending interrupt with IME clear. Returns true if
    /// that triggers the halt bug.
    pub fn wake_without_service(&mut self, cycle: u64) -> bool {
        let bug = self.halt_cycle.take() == Some(cycle);
        self.halt_bug |= bug;
        bug
    }

    pub fn clear_halt(&mut self) {
        self.halt_cycle = None;
    }
}
