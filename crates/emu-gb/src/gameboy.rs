//! Top-level handheld system.
//!
//! The CPU runs one instruction (or interrupt dispatch, or one idle cycle
//! while halted) and reports the machine cycles it spent; the PPU is then
//! advanced by exactly that many. Timers, serial and the cartridge clock
//! already ticked inside the CPU step through the bus.
//!
//! One frame = 154 lines x 114 machine cycles = 17,556 machine cycles.

use std::sync::atomic::{AtomicBool, Ordering};

use emu_core::frame::Subscriber;
use emu_core::{Observable, Value};

use crate::bus::GbBus;
use crate::cartridge::{self, Cartridge};
use crate::config::{CYCLES_PER_FRAME, GbConfig};
use crate::cpu;
use crate::error::GbError;
use crate::input::{GbButton, InputQueue};
use crate::memory::io;
use crate::ppu::{FrameBuffer, Ppu};

/// Handheld system.
pub struct GameBoy {
    bus: GbBus,
    ppu: Ppu,
    /// Frames started by `run_frame`; the input queue's timeline.
    frame_count: u64,
    input_queue: InputQueue,
    /// Set once the CPU hits a fatal condition; the machine stays stopped.
    fault: Option<GbError>,
}

impl GameBoy {
    /// Power on with the cartridge in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ROM image cannot be parsed. Save data of
    /// the wrong size is logged and ignored.
    pub fn new(config: &GbConfig) -> Result<Self, GbError> {
        let cartridge = load_cartridge(config)?;
        Ok(Self {
            bus: GbBus::new(cartridge),
            ppu: Ppu::new(),
            frame_count: 0,
            input_queue: InputQueue::new(),
            fault: None,
        })
    }

    /// Swap cartridges and power-cycle. On failure the running session
    /// is left untouched and `false` is returned.
    pub fn load_rom(&mut self, config: &GbConfig) -> bool {
        let Ok(cartridge) = load_cartridge(config) else {
            return false;
        };
        self.bus = GbBus::new(cartridge);
        self.ppu.reset();
        self.frame_count = 0;
        self.input_queue = InputQueue::new();
        self.fault = None;
        true
    }

    /// One CPU step followed by the same number of PPU cycles.
    ///
    /// # Errors
    ///
    /// Returns [`GbError::IllegalOpcode`] if the CPU fetched one. Every
    /// later call returns the same error without running anything.
    pub fn step(&mut self) -> Result<u32, GbError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        let cycles = cpu::step(&mut self.bus).inspect_err(|error| {
            self.fault = Some(error.clone());
        })?;
        self.ppu.tick_n(&mut self.bus, cycles);
        Ok(cycles)
    }

    /// Run one frame's worth of machine cycles.
    ///
    /// Processes any input queue events due this frame first. Returns the
    /// machine cycles executed, which can overshoot the frame length by
    /// the tail of the last instruction.
    pub fn run_frame(&mut self) -> Result<u64, GbError> {
        let start = self.bus.cycles();
        let target = self.begin_frame();
        while self.bus.cycles() < target {
            self.step()?;
        }
        Ok(self.bus.cycles() - start)
    }

    /// Run frames until `cancel` is set. The flag is checked between
    /// instructions, so the machine is always left on an instruction
    /// boundary. Returns the number of frames completed.
    pub fn run_until_cancelled(&mut self, cancel: &AtomicBool) -> Result<u64, GbError> {
        let mut completed = 0;
        loop {
            let target = self.begin_frame();
            while self.bus.cycles() < target {
                if cancel.load(Ordering::Relaxed) {
                    log::debug!("cancelled after {completed} frames");
                    return Ok(completed);
                }
                self.step()?;
            }
            completed += 1;
        }
    }

    /// Apply due input and return the cycle count at which the frame ends.
    fn begin_frame(&mut self) -> u64 {
        self.input_queue.process(self.frame_count, &mut self.bus);
        self.frame_count += 1;
        self.bus.cycles() + u64::from(CYCLES_PER_FRAME)
    }

    pub fn press(&mut self, button: GbButton) {
        self.bus.set_button(button, true);
    }

    pub fn release(&mut self, button: GbButton) {
        self.bus.set_button(button, false);
    }

    pub fn release_all(&mut self) {
        self.bus.controller.release_all();
    }

    /// Battery-backed cartridge RAM, if any.
    #[must_use]
    pub fn save_data(&self) -> Option<Vec<u8>> {
        cartridge::save_data(self.bus.memory.cartridge())
    }

    /// Restore cartridge RAM.
    ///
    /// # Errors
    ///
    /// Returns [`GbError::SaveDataSize`] if `data` does not match the
    /// cartridge RAM size.
    pub fn load_save_data(&mut self, data: &[u8]) -> Result<(), GbError> {
        cartridge::load_save_data(self.bus.memory.cartridge_mut(), data)
    }

    /// The last completed frame.
    #[must_use]
    pub fn frame(&self) -> &FrameBuffer {
        self.ppu.frame()
    }

    /// Completed frames are published here as well; subscribers observe
    /// the stream closing when the machine is dropped.
    #[must_use]
    pub fn subscribe_frames(&self) -> Subscriber<FrameBuffer> {
        self.ppu.subscribe()
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Machine cycles since power-on.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.bus.cycles()
    }

    /// Bytes shifted out of the serial port since the last
    /// [`GameBoy::take_serial_output`].
    #[must_use]
    pub fn serial_output(&self) -> &[u8] {
        self.bus.serial.output()
    }

    /// Drain the captured serial bytes.
    pub fn take_serial_output(&mut self) -> Vec<u8> {
        self.bus.serial.take_output()
    }

    pub fn input_queue(&mut self) -> &mut InputQueue {
        &mut self.input_queue
    }

    #[must_use]
    pub fn bus(&self) -> &GbBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut GbBus {
        &mut self.bus
    }

    #[must_use]
    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    #[must_use]
    pub fn cartridge(&self) -> &dyn Cartridge {
        self.bus.memory.cartridge()
    }
}

fn load_cartridge(config: &GbConfig) -> Result<Box<dyn Cartridge>, GbError> {
    let mut cartridge = cartridge::from_rom(&config.rom_data).inspect_err(|error| {
        log::error!("cannot load ROM: {error}");
    })?;
    if let Some(save) = &config.save_data {
        if let Err(error) = cartridge::load_save_data(cartridge.as_mut(), save) {
            log::warn!("ignoring save data: {error}");
        }
    }
    Ok(cartridge)
}

impl Observable for GameBoy {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.bus.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("ppu.") {
            self.ppu.query(rest)
        } else if let Some(rest) = path.strip_prefix("timer.") {
            let timers = &self.bus.timers;
            match rest {
                "div" => Some(self.bus.read(io::DIV).into()),
                "tima" => Some(self.bus.read(io::TIMA).into()),
                "tma" => Some(self.bus.read(io::TMA).into()),
                "tac" => Some(self.bus.read(io::TAC).into()),
                "overflow_pending" => Some(timers.overflow_pending().into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("interrupts.") {
            let interrupts = &self.bus.interrupts;
            match rest {
                "ime" => Some(interrupts.ime.into()),
                "ie" => Some(self.bus.read(io::IE).into()),
                "if" => Some(self.bus.read(io::IF).into()),
                "halt_bug" => Some(interrupts.halt_bug.into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("memory.") {
            emu_core::parse_address(rest).map(|address| Value::U8(self.bus.read(address)))
        } else {
            match path {
                "cycles" => Some(self.bus.cycles().into()),
                "frame_count" => Some(self.frame_count.into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.<register>",
            "cpu.flags.<z|n|h|c>",
            "cpu.halted",
            "cpu.stopped",
            "ppu.mode",
            "ppu.ly",
            "ppu.line_cycle",
            "ppu.window_line",
            "ppu.lcd_on",
            "ppu.frame_count",
            "timer.div",
            "timer.tima",
            "timer.tma",
            "timer.tac",
            "timer.overflow_pending",
            "interrupts.ime",
            "interrupts.ie",
            "interrupts.if",
            "interrupts.halt_bug",
            "memory.<address>",
            "cycles",
            "frame_count",
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::testing::rom_image;

    /// JR -2: spin forever.
    const SPIN: [u8; 2] = [0x18, 0xFE];

    fn make_gameboy(program: &[u8]) -> GameBoy {
        GameBoy::new(&GbConfig::new(rom_image(0x00, 2, 0, program))).expect("valid image")
    }

    #[test]
    fn run_frame_covers_one_frame_of_cycles() {
        let mut gb = make_gameboy(&SPIN);
        let cycles = gb.run_frame().expect("runs");
        assert!(cycles >= u64::from(CYCLES_PER_FRAME));
        assert!(cycles < u64::from(CYCLES_PER_FRAME) + 6);
        assert_eq!(gb.frame_count(), 1);
    }

    #[test]
    fn frames_are_emitted_each_frame() {
        let mut gb = make_gameboy(&SPIN);
        let mut frames = gb.subscribe_frames();
        for _ in 0..3 {
            gb.run_frame().expect("runs");
        }
        assert_eq!(gb.ppu().frame_count(), 3);
        let (sequence, _) = frames.try_latest().expect("a frame");
        assert_eq!(sequence, 3);
    }

    #[test]
    fn subscriber_follows_a_machine_on_another_thread() {
        let mut gb = make_gameboy(&SPIN);
        let mut frames = gb.subscribe_frames();
        assert!(frames.try_latest().is_none());

        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);
        let worker = thread::spawn(move || {
            let result = gb.run_until_cancelled(&worker_cancel);
            (gb, result)
        });

        let mut last = 0;
        while last < 2 {
            let (sequence, frame) = frames.wait_next(Duration::from_secs(5)).expect("a frame");
            assert!(sequence > last, "frames arrive in order");
            assert_eq!(frame.pixels.len(), frame.width * frame.height);
            last = sequence;
        }
        cancel.store(true, Ordering::Relaxed);
        let (gb, result) = worker.join().expect("worker thread");
        assert!(result.is_ok());
        assert!(gb.ppu().frame_count() >= last);

        if let Some((sequence, _)) = frames.try_latest() {
            assert!(sequence > last);
        }
        drop(gb);
        assert!(frames.wait_next(Duration::from_millis(10)).is_none());
        assert!(frames.is_closed());
    }

    #[test]
    fn serial_output_is_drained_when_taken() {
        // LD A,'K'; LDH (SB),A; LD A,0x81; LDH (SC),A; JR -2
        let mut gb = make_gameboy(&[0x3E, b'K', 0xE0, 0x01, 0x3E, 0x81, 0xE0, 0x02, 0x18, 0xFE]);
        gb.run_frame().expect("runs");
        assert_eq!(gb.serial_output(), b"K");
        assert_eq!(gb.take_serial_output(), b"K");
        assert!(gb.serial_output().is_empty());
        assert!(gb.take_serial_output().is_empty());
    }

    #[test]
    fn dropping_the_machine_closes_the_stream() {
        let gb = make_gameboy(&SPIN);
        let frames = gb.subscribe_frames();
        drop(gb);
        assert!(frames.is_closed());
    }

    #[test]
    fn illegal_opcode_stops_the_machine() {
        let mut gb = make_gameboy(&[0xD3]);
        // 0x0100: NOP, JP 0x0150
        gb.step().expect("NOP");
        gb.step().expect("JP");
        let error = gb.step().expect_err("illegal");
        assert_eq!(error, GbError::IllegalOpcode { opcode: 0xD3, pc: 0x0150 });
        let cycles = gb.cycles();
        assert_eq!(gb.step(), Err(error));
        assert_eq!(gb.cycles(), cycles);
    }

    #[test]
    fn cancel_flag_stops_between_instructions() {
        let mut gb = make_gameboy(&SPIN);
        let cancel = AtomicBool::new(true);
        assert_eq!(gb.run_until_cancelled(&cancel), Ok(0));
        assert_eq!(gb.cycles(), 0);
    }

    #[test]
    fn scripted_input_reaches_the_joypad() {
        let mut gb = make_gameboy(&SPIN);
        gb.bus_mut().write(io::P1, 0x10);
        gb.input_queue().enqueue_button(GbButton::A, 1, 1);
        gb.run_frame().expect("runs");
        assert_eq!(gb.bus().read(io::P1) & 0x01, 0x01);
        gb.run_frame().expect("runs");
        assert_eq!(gb.bus().read(io::P1) & 0x01, 0x00, "A held during frame 1");
        gb.run_frame().expect("runs");
        assert_eq!(gb.bus().read(io::P1) & 0x01, 0x01);
    }

    #[test]
    fn battery_ram_round_trips_through_config() {
        let image = rom_image(0x03, 4, 2, &SPIN);
        let mut gb = GameBoy::new(&GbConfig::new(image.clone())).expect("valid image");
        let mut save = gb.save_data().expect("battery RAM");
        save[0] = 0x42;
        assert!(gb.load_save_data(&save[1..]).is_err());

        let config = GbConfig {
            rom_data: image,
            save_data: Some(save),
        };
        let gb = GameBoy::new(&config).expect("valid image");
        assert_eq!(gb.save_data().expect("battery RAM")[0], 0x42);
    }

    #[test]
    fn load_rom_failure_keeps_the_session() {
        let mut gb = make_gameboy(&SPIN);
        gb.run_frame().expect("runs");
        let cycles = gb.cycles();
        assert!(!gb.load_rom(&GbConfig::new(vec![0; 16])));
        assert_eq!(gb.cycles(), cycles);
        assert!(gb.load_rom(&GbConfig::new(rom_image(0x00, 2, 0, &SPIN))));
        assert_eq!(gb.cycles(), 0);
        assert_eq!(gb.frame_count(), 0);
    }

    #[test]
    fn observable_paths() {
        let mut gb = make_gameboy(&SPIN);
        gb.bus_mut().write(0xC000, 0x99);
        assert_eq!(gb.query("cpu.pc"), Some(Value::U16(0x0100)));
        assert_eq!(gb.query("cpu.flags.z"), Some(Value::Bool(true)));
        assert_eq!(gb.query("memory.0xC000"), Some(Value::U8(0x99)));
        assert_eq!(gb.query("ppu.ly"), Some(Value::U8(0)));
        assert_eq!(gb.query("interrupts.ime"), Some(Value::Bool(false)));
        assert_eq!(gb.query("cycles"), Some(Value::U64(0)));
        assert_eq!(gb.query("bogus"), None);
    }
}
