//! The machine bus.
//!
//! Owns the CPU, memory, timers, joypad and serial port, and is the only
//! path by which any of them touch another.
//!
//! Timing: plain [`GbBus::read`]/[`GbBus::write`] cost nothing. The CPU
//! uses the `cycle_*`, `fetch*` and stack helpers, each of which ticks
//! the timers once per machine cycle the hardware spends.

use emu_core::Tickable;

use crate::cartridge::Cartridge;
use crate::controller::Controller;
use crate::cpu::Cpu;
use crate::input::GbButton;
use crate::interrupts::{self, Interrupt, Interrupts};
use crate::memory::{MemoryManager, io};
use crate::serial::Serial;
use crate::timers::Timers;

const SC_START: u8 = 0x80;
const SC_INTERNAL_CLOCK: u8 = 0x01;

pub struct GbBus {
    pub cpu: Cpu,
    pub memory: MemoryManager,
    pub timers: Timers,
    pub interrupts: Interrupts,
    pub controller: Controller,
    pub serial: Serial,
    /// Machine cycles spent by the step in progress.
    step_cycles: u32,
}

impl GbBus {
    #[must_use]
    pub fn new(cartridge: Box<dyn Cartridge>) -> Self {
        Self {
            cpu: Cpu::new(),
            memory: MemoryManager::new(cartridge),
            timers: Timers::default(),
            interrupts: Interrupts::default(),
            controller: Controller::new(),
            serial: Serial::default(),
            step_cycles: 0,
        }
    }

    /// Read a byte with register readout applied. No time passes.
    #[must_use]
    pub fn read(&self, address: u16) -> u8 {
        match address {
            io::P1 => self.controller.read(self.memory.read_io(io::P1)),
            _ => self.memory.read(address),
        }
    }

    /// Write a byte, applying register side effects. No time passes.
    pub fn write(&mut self, address: u16, value: u8) {
        match address {
            io::DIV => {
                self.timers.reset_divider();
                self.memory.write(address, value);
            }
            io::DMA => {
                self.memory.write(address, value);
                self.memory.dma_to_oam(value);
            }
            io::SC => {
                self.memory.write(address, value);
                if value & (SC_START | SC_INTERNAL_CLOCK) == SC_START | SC_INTERNAL_CLOCK {
                    self.serial.start(self.memory.read_io(io::SB));
                }
            }
            _ => self.memory.write(address, value),
        }
    }

    /// Privileged write for the PPU's LY/STAT updates.
    pub fn write_from_ppu(&mut self, address: u16, value: u8) {
        self.memory.write_io(address, value);
    }

    /// Advance every cycle-counted peripheral by one machine cycle.
    pub fn tick(&mut self) {
        self.timers.tick(&mut self.memory);
        self.serial.tick();
        if self.serial.take_completed() {
            self.memory.write_io(io::SB, 0xFF);
            let control = self.memory.read_io(io::SC);
            self.memory.write_io(io::SC, control & !SC_START);
            self.request_interrupt(Interrupt::Serial);
        }
        self.memory.cartridge_mut().tick();
        self.step_cycles += 1;
    }

    /// One machine cycle with no bus access.
    pub fn idle(&mut self) {
        self.tick();
    }

    pub fn cycle_read(&mut self, address: u16) -> u8 {
        let value = self.read(address);
        self.tick();
        value
    }

    pub fn cycle_write(&mut self, address: u16, value: u8) {
        self.write(address, value);
        self.tick();
    }

    /// Read the byte at PC and advance PC.
    pub fn fetch8(&mut self) -> u8 {
        let pc = self.cpu.regs.pc;
        self.cpu.regs.pc = pc.wrapping_add(1);
        self.cycle_read(pc)
    }

    /// Two-byte little-endian operand at PC. Ticks twice, then reads.
    pub fn fetch_nn(&mut self) -> u16 {
        self.tick();
        self.tick();
        let pc = self.cpu.regs.pc;
        let low = self.read(pc);
        let high = self.read(pc.wrapping_add(1));
        self.cpu.regs.pc = pc.wrapping_add(2);
        u16::from_le_bytes([low, high])
    }

    /// Push a word: high byte at SP-1, low byte at SP-2.
    pub fn push16(&mut self, value: u16) {
        let [low, high] = value.to_le_bytes();
        let regs = &mut self.cpu.regs;
        regs.sp = regs.sp.wrapping_sub(1);
        let high_at = regs.sp;
        regs.sp = regs.sp.wrapping_sub(1);
        let low_at = regs.sp;
        self.cycle_write(high_at, high);
        self.cycle_write(low_at, low);
    }

    pub fn pop16(&mut self) -> u16 {
        let sp = self.cpu.regs.sp;
        let low = self.cycle_read(sp);
        let high = self.cycle_read(sp.wrapping_add(1));
        self.cpu.regs.sp = sp.wrapping_add(2);
        u16::from_le_bytes([low, high])
    }

    /// Push PC, as CALL, RST and interrupt dispatch do.
    pub fn push_pc(&mut self) {
        self.push16(self.cpu.regs.pc);
    }

    /// Set `interrupt`'s IF bit.
    pub fn request_interrupt(&mut self, interrupt: Interrupt) {
        interrupts::request(&mut self.memory, interrupt);
    }

    /// Press or release a button. A new press requests the joypad
    /// interrupt and ends STOP.
    pub fn set_button(&mut self, button: GbButton, pressed: bool) {
        if self.controller.set_button(button.bit(), pressed) {
            self.request_interrupt(Interrupt::Joypad);
            self.cpu.stopped = false;
        }
    }

    /// Machine cycles since power-on.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.timers.cycles
    }

    pub(crate) fn begin_step(&mut self) {
        self.step_cycles = 0;
    }

    pub(crate) fn step_cycles(&self) -> u32 {
        self.step_cycles
    }
}
