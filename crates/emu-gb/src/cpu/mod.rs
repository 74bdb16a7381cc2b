//! SM83 CPU: registers, interrupt dispatch and the fetch/execute step.
//!
//! Every instruction runs to completion inside [`step`]; the bus ticks the
//! timers once per machine cycle spent, so the returned cycle count is
//! exactly what the PPU must be advanced by.

pub mod alu;
mod control;
mod decoder;
pub mod flags;
mod jump;
mod load16;
mod load8;
pub mod registers;
pub mod rotate_shift;
mod single_bit;

pub use registers::{Reg16, Registers};

use emu_core::{Observable, Value};

use crate::bus::GbBus;
use crate::error::GbError;
use crate::interrupts::{self, Interrupt};
use crate::memory::io;

/// CPU state outside the register file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cpu {
    pub regs: Registers,
    /// HALT: no fetches until an interrupt is pending.
    pub halted: bool,
    /// STOP: no fetches until a button is pressed.
    pub stopped: bool,
}

impl Cpu {
    /// CPU as left by the boot ROM.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::post_boot(),
            halted: false,
            stopped: false,
        }
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

const QUERY_PATHS: &[&str] = &[
    "a", "f", "b", "c", "d", "e", "h", "l",
    "af", "bc", "de", "hl", "sp", "pc",
    "flags.z", "flags.n", "flags.h", "flags.c",
    "halted", "stopped",
];

impl Observable for Cpu {
    fn query(&self, path: &str) -> Option<Value> {
        let regs = &self.regs;
        match path {
            "a" => Some(regs.a.into()),
            "f" => Some(regs.f.into()),
            "b" => Some(regs.b.into()),
            "c" => Some(regs.c.into()),
            "d" => Some(regs.d.into()),
            "e" => Some(regs.e.into()),
            "h" => Some(regs.h.into()),
            "l" => Some(regs.l.into()),

            "af" => Some(regs.af().into()),
            "bc" => Some(regs.bc().into()),
            "de" => Some(regs.de().into()),
            "hl" => Some(regs.hl().into()),
            "sp" => Some(regs.sp.into()),
            "pc" => Some(regs.pc.into()),

            "flags.z" => Some(regs.zero().into()),
            "flags.n" => Some(regs.subtract().into()),
            "flags.h" => Some(regs.half_carry().into()),
            "flags.c" => Some(regs.carry().into()),

            "halted" => Some(self.halted.into()),
            "stopped" => Some(self.stopped.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}

/// 8-bit operand encoded in three opcode bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg8 {
    B,
    C,
    D,
    E,
    H,
    L,
    /// The byte at (HL); costs a machine cycle per access.
    HlIndirect,
    A,
}

impl Reg8 {
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Self::B,
            1 => Self::C,
            2 => Self::D,
            3 => Self::E,
            4 => Self::H,
            5 => Self::L,
            6 => Self::HlIndirect,
            _ => Self::A,
        }
    }
}

/// Read an operand, ticking once for (HL).
pub(crate) fn read8(bus: &mut GbBus, reg: Reg8) -> u8 {
    let regs = &bus.cpu.regs;
    match reg {
        Reg8::B => regs.b,
        Reg8::C => regs.c,
        Reg8::D => regs.d,
        Reg8::E => regs.e,
        Reg8::H => regs.h,
        Reg8::L => regs.l,
        Reg8::HlIndirect => {
            let hl = regs.hl();
            bus.cycle_read(hl)
        }
        Reg8::A => regs.a,
    }
}

/// Write an operand, ticking once for (HL).
pub(crate) fn write8(bus: &mut GbBus, reg: Reg8, value: u8) {
    let regs = &mut bus.cpu.regs;
    match reg {
        Reg8::B => regs.b = value,
        Reg8::C => regs.c = value,
        Reg8::D => regs.d = value,
        Reg8::E => regs.e = value,
        Reg8::H => regs.h = value,
        Reg8::L => regs.l = value,
        Reg8::HlIndirect => {
            let hl = regs.hl();
            bus.cycle_write(hl, value);
        }
        Reg8::A => regs.a = value,
    }
}

/// Branch condition in opcode bits 3-4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    NotZero,
    Zero,
    NotCarry,
    Carry,
}

impl Condition {
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::NotZero,
            1 => Self::Zero,
            2 => Self::NotCarry,
            _ => Self::Carry,
        }
    }

    #[must_use]
    pub fn holds(self, regs: &Registers) -> bool {
        match self {
            Self::NotZero => !regs.zero(),
            Self::Zero => regs.zero(),
            Self::NotCarry => !regs.carry(),
            Self::Carry => regs.carry(),
        }
    }
}

/// Run one step: service an interrupt, idle while halted or stopped, or
/// execute one instruction. Returns the machine cycles consumed.
///
/// # Errors
///
/// Returns [`GbError::IllegalOpcode`] when an opcode with no defined
/// behaviour is fetched. The machine must not be stepped further.
pub fn step(bus: &mut GbBus) -> Result<u32, GbError> {
    bus.begin_step();

    if bus.cpu.stopped {
        bus.idle();
        return Ok(bus.step_cycles());
    }

    let pending = interrupts::pending(&bus.memory);
    if pending != 0 {
        if bus.interrupts.ime {
            if let Some(source) = Interrupt::highest(pending) {
                dispatch(bus, source);
                return Ok(bus.step_cycles());
            }
        } else if bus.cpu.halted {
            bus.cpu.halted = false;
            let cycle = bus.cycles();
            if bus.interrupts.wake_without_service(cycle) {
                log::trace!("halt bug at {:#06X}", bus.cpu.regs.pc);
            }
        }
    }

    if bus.cpu.halted {
        bus.idle();
        return Ok(bus.step_cycles());
    }

    let pc = bus.cpu.regs.pc;
    let opcode = fetch_opcode(bus);
    decoder::execute(bus, opcode, pc).inspect_err(|error| {
        log::error!("{error}; registers {:?}", bus.cpu.regs);
    })?;
    bus.interrupts.end_of_instruction();
    Ok(bus.step_cycles())
}

/// Opcode fetch. After the halt bug the PC fails to advance once, so the
/// byte after HALT is read twice.
fn fetch_opcode(bus: &mut GbBus) -> u8 {
    if bus.interrupts.halt_bug {
        bus.interrupts.halt_bug = false;
        bus.cycle_read(bus.cpu.regs.pc)
    } else {
        bus.fetch8()
    }
}

/// Jump to `source`'s vector: two internal cycles, PC pushed, one more.
fn dispatch(bus: &mut GbBus, source: Interrupt) {
    bus.cpu.halted = false;
    bus.interrupts.ime = false;
    bus.interrupts.clear_halt();
    bus.idle();
    bus.idle();
    bus.push_pc();
    let flags = bus.memory.read_io(io::IF);
    bus.memory.write_io(io::IF, flags & !source.mask());
    bus.cpu.regs.pc = source.vector();
    bus.idle();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::GbButton;
    use crate::testing::bus_with_program;

    fn run(bus: &mut GbBus) -> u32 {
        step(bus).expect("legal opcode")
    }

    fn arm(bus: &mut GbBus, enabled: u8, requested: u8) {
        bus.write(io::IE, enabled);
        bus.write(io::IF, requested);
        bus.cpu.regs.sp = 0xDFF0;
    }

    #[test]
    fn dispatch_takes_highest_priority_and_five_cycles() {
        let mut bus = bus_with_program(&[0x00]);
        arm(&mut bus, 0x05, 0x05);
        bus.interrupts.ime = true;
        assert_eq!(run(&mut bus), 5);
        assert_eq!(bus.cpu.regs.pc, Interrupt::VBlank.vector());
        assert_eq!(bus.read(io::IF) & 0x1F, Interrupt::Timer.mask());
        assert!(!bus.interrupts.ime);
        assert_eq!(bus.cpu.regs.sp, 0xDFEE);
        assert_eq!(bus.pop16(), 0x0150);
    }

    #[test]
    fn ei_takes_effect_after_the_next_instruction() {
        let mut bus = bus_with_program(&[0xFB, 0x00, 0x00]);
        arm(&mut bus, 0x04, 0x04);
        run(&mut bus);
        assert!(!bus.interrupts.ime);
        run(&mut bus);
        assert!(bus.interrupts.ime);
        assert_eq!(bus.cpu.regs.pc, 0x0152);
        run(&mut bus);
        assert_eq!(bus.cpu.regs.pc, Interrupt::Timer.vector());
    }

    #[test]
    fn di_is_deferred_like_ei() {
        let mut bus = bus_with_program(&[0xF3, 0x00]);
        bus.interrupts.ime = true;
        run(&mut bus);
        assert!(bus.interrupts.ime);
        run(&mut bus);
        assert!(!bus.interrupts.ime);
    }

    #[test]
    fn halt_idles_until_an_interrupt_is_pending() {
        let mut bus = bus_with_program(&[0x76, 0x04]);
        arm(&mut bus, 0x04, 0x00);
        bus.cpu.regs.b = 0;
        run(&mut bus);
        assert!(bus.cpu.halted);
        assert_eq!(run(&mut bus), 1);
        assert!(bus.cpu.halted);
        assert_eq!(bus.cpu.regs.pc, 0x0151);

        bus.write(io::IF, 0x04);
        run(&mut bus);
        assert!(!bus.cpu.halted);
        assert_eq!(bus.cpu.regs.b, 1);
        assert_eq!(bus.cpu.regs.pc, 0x0152);
        assert_eq!(bus.read(io::IF) & 0x1F, 0x04, "not serviced without IME");
    }

    #[test]
    fn halted_cpu_services_interrupt_with_ime() {
        let mut bus = bus_with_program(&[0x76, 0x00]);
        arm(&mut bus, 0x01, 0x00);
        bus.interrupts.ime = true;
        run(&mut bus);
        run(&mut bus);
        bus.write(io::IF, 0x01);
        assert_eq!(run(&mut bus), 5);
        assert!(!bus.cpu.halted);
        assert_eq!(bus.cpu.regs.pc, Interrupt::VBlank.vector());
        assert_eq!(bus.pop16(), 0x0151);
    }

    #[test]
    fn halt_bug_repeats_the_following_byte() {
        let mut bus = bus_with_program(&[0x76, 0x04, 0x00]);
        arm(&mut bus, 0x04, 0x04);
        bus.cpu.regs.b = 0;
        run(&mut bus);
        run(&mut bus);
        assert_eq!(bus.cpu.regs.b, 1);
        assert_eq!(bus.cpu.regs.pc, 0x0151);
        run(&mut bus);
        assert_eq!(bus.cpu.regs.b, 2);
        assert_eq!(bus.cpu.regs.pc, 0x0152);
    }

    #[test]
    fn stop_waits_for_a_button_press() {
        let mut bus = bus_with_program(&[0x10, 0x00, 0x04]);
        arm(&mut bus, 0x00, 0x00);
        bus.cpu.regs.b = 0;
        run(&mut bus);
        assert!(bus.cpu.stopped);
        assert_eq!(run(&mut bus), 1);
        assert_eq!(bus.cpu.regs.pc, 0x0152);

        bus.set_button(GbButton::Start, true);
        assert!(!bus.cpu.stopped);
        run(&mut bus);
        assert_eq!(bus.cpu.regs.b, 1);
        assert_eq!(bus.read(io::IF) & 0x1F, Interrupt::Joypad.mask());
    }

    #[test]
    fn illegal_opcode_reports_its_address() {
        let mut bus = bus_with_program(&[0x00, 0xDD]);
        run(&mut bus);
        assert_eq!(
            step(&mut bus),
            Err(GbError::IllegalOpcode { opcode: 0xDD, pc: 0x0151 })
        );
    }

    #[test]
    fn timers_advance_with_instruction_cycles() {
        let mut bus = bus_with_program(&[0xCD, 0x00, 0x02]);
        bus.cpu.regs.sp = 0xDFF0;
        let before = bus.cycles();
        assert_eq!(run(&mut bus), 6);
        assert_eq!(bus.cycles() - before, 6);
    }
}
