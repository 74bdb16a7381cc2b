//! DIV/TIMA timers and the machine-cycle counter.

use crate::bits::BitExt;
use crate::interrupts::{self, Interrupt};
use crate::memory::{MemoryManager, io};

/// Machine cycles per DIV increment.
const DIV_PERIOD: u32 = 64;
const TAC_ENABLE_BIT: u8 = 2;

/// Machine cycles per TIMA increment for TAC bits 0-1.
#[must_use]
pub const fn tima_period(tac: u8) -> u32 {
    match tac & 0x03 {
        0 => 256,
        1 => 4,
        2 => 16,
        _ => 64,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timers {
    /// Machine cycles since power-on.
    pub cycles: u64,
    div_counter: u32,
    tima_counter: u32,
    /// TIMA wrapped on the previous tick; reload and interrupt are due.
    overflow_pending: bool,
}

impl Timers {
    /// Advance one machine cycle.
    pub fn tick(&mut self, memory: &mut MemoryManager) {
        self.cycles += 1;

        if self.overflow_pending {
            self.overflow_pending = false;
            let modulo = memory.read_io(io::TMA);
            memory.write_io(io::TIMA, modulo);
            interrupts::request(memory, Interrupt::Timer);
        }

        self.div_counter += 1;
        if self.div_counter == DIV_PERIOD {
            self.div_counter = 0;
            let div = memory.read_io(io::DIV);
            memory.write_io(io::DIV, div.wrapping_add(1));
        }

        let tac = memory.read_io(io::TAC);
        if !tac.bit(TAC_ENABLE_BIT) {
            return;
        }
        self.tima_counter += 1;
        if self.tima_counter >= tima_period(tac) {
            self.tima_counter = 0;
            let (tima, overflow) = memory.read_io(io::TIMA).overflowing_add(1);
            memory.write_io(io::TIMA, tima);
            self.overflow_pending = overflow;
        }
    }

    /// A CPU write to DIV (or STOP) clears the divider chain.
    pub fn reset_divider(&mut self) {
        self.div_counter = 0;
        self.tima_counter = 0;
    }

    #[must_use]
    pub fn overflow_pending(&self) -> bool {
        self.overflow_pending
    }
}
