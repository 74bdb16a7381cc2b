//! Pixel processing unit.
//!
//! Advanced one machine cycle at a time, after the CPU step that spent
//! those cycles. Each visible line runs:
//!
//! | Cycles  | Mode           |
//! |---------|----------------|
//! | 0-19    | OAM scan       |
//! | 20-62   | pixel transfer (line rasterized when it ends) |
//! | 63-113  | `HBlank`       |
//!
//! Lines 144-153 are `VBlank`. Entering line 144 requests the `VBlank`
//! interrupt and publishes the finished frame.

mod drawer;
pub mod frame;
pub mod registers;

pub use drawer::shade;
pub use frame::FrameBuffer;
pub use registers::{Mode, PpuRegisters};

use emu_core::frame::{Publisher, Subscriber, latest_channel};
use emu_core::{Observable, Value};

use crate::bus::GbBus;
use crate::config::CYCLES_PER_LINE;
use crate::interrupts::Interrupt;
use crate::memory::io;
use frame::{HEIGHT, WIDTH};

const OAM_SCAN_CYCLES: u32 = 20;
const TRANSFER_END: u32 = 63;
const VISIBLE_LINES: u8 = 144;
const LAST_LINE: u8 = 153;

pub struct Ppu {
    regs: PpuRegisters,
    /// LCDC bit 7 as of the last tick.
    enabled: bool,
    /// STAT interrupt line level, for edge detection.
    stat_line: bool,
    /// Frame being drawn, row-major shades.
    back: Box<[u8]>,
    latest: FrameBuffer,
    frame_count: u64,
    publisher: Publisher<FrameBuffer>,
}

impl Ppu {
    #[must_use]
    pub fn new() -> Self {
        let (publisher, _) = latest_channel();
        Self {
            regs: PpuRegisters::new(),
            enabled: false,
            stat_line: false,
            back: vec![0; WIDTH * HEIGHT].into_boxed_slice(),
            latest: FrameBuffer::blank(),
            frame_count: 0,
            publisher,
        }
    }

    /// Back to power-on timing state. Subscribers and the frame counter
    /// are kept.
    pub fn reset(&mut self) {
        self.regs = PpuRegisters::new();
        self.enabled = false;
        self.stat_line = false;
        self.back.fill(0);
    }

    /// Advance by one machine cycle.
    pub fn tick(&mut self, bus: &mut GbBus) {
        self.regs.refresh(bus);
        if !self.regs.lcd_on {
            if self.enabled {
                self.switch_off(bus);
            }
            return;
        }
        if !self.enabled {
            self.switch_on(bus);
        }

        self.regs.line_cycle += 1;
        if self.regs.ly < VISIBLE_LINES {
            match self.regs.line_cycle {
                OAM_SCAN_CYCLES => self.regs.mode = Mode::PixelTransfer,
                TRANSFER_END => {
                    self.draw_line(bus);
                    self.regs.mode = Mode::HBlank;
                }
                _ => {}
            }
        }
        if self.regs.line_cycle == CYCLES_PER_LINE {
            self.regs.line_cycle = 0;
            self.next_line(bus);
        }
        self.update_stat(bus);
    }

    /// Advance by `cycles` machine cycles.
    pub fn tick_n(&mut self, bus: &mut GbBus, cycles: u32) {
        for _ in 0..cycles {
            self.tick(bus);
        }
    }

    fn next_line(&mut self, bus: &mut GbBus) {
        let ly = self.regs.ly.wrapping_add(1);
        self.regs.ly = match ly {
            VISIBLE_LINES => {
                self.regs.mode = Mode::VBlank;
                bus.request_interrupt(Interrupt::VBlank);
                self.finish_frame();
                ly
            }
            line if line > LAST_LINE => {
                self.regs.mode = Mode::OamScan;
                self.regs.window_line = 0;
                0
            }
            line if line < VISIBLE_LINES => {
                self.regs.mode = Mode::OamScan;
                line
            }
            line => line,
        };
        bus.write_from_ppu(io::LY, self.regs.ly);
    }

    fn draw_line(&mut self, bus: &GbBus) {
        let mut line = [0u8; WIDTH];
        if drawer::draw_line(&mut line, bus.memory.vram(), bus.memory.oam(), &self.regs) {
            self.regs.window_line = self.regs.window_line.wrapping_add(1);
        }
        let start = usize::from(self.regs.ly) * WIDTH;
        self.back[start..start + WIDTH].copy_from_slice(&line);
    }

    fn finish_frame(&mut self) {
        let frame = FrameBuffer::from_pixels(&self.back);
        self.latest = frame.clone();
        self.frame_count += 1;
        let sequence = self.publisher.publish(frame);
        log::trace!("frame {sequence} published");
    }

    /// Write STAT's mode and coincidence bits and raise the STAT
    /// interrupt on a rising edge of its line.
    fn update_stat(&mut self, bus: &mut GbBus) {
        bus.write_from_ppu(io::STAT, self.regs.stat_value());
        let line = self.regs.stat_line();
        if line && !self.stat_line {
            bus.request_interrupt(Interrupt::Stat);
        }
        self.stat_line = line;
    }

    fn switch_on(&mut self, bus: &mut GbBus) {
        log::debug!("LCD on");
        self.enabled = true;
        self.regs.mode = Mode::OamScan;
        self.regs.line_cycle = 0;
        self.regs.ly = 0;
        self.regs.window_line = 0;
        bus.write_from_ppu(io::LY, 0);
    }

    fn switch_off(&mut self, bus: &mut GbBus) {
        log::debug!("LCD off at line {}", self.regs.ly);
        self.enabled = false;
        self.regs.mode = Mode::HBlank;
        self.regs.line_cycle = 0;
        self.regs.ly = 0;
        self.regs.window_line = 0;
        self.stat_line = false;
        bus.write_from_ppu(io::LY, 0);
        bus.write_from_ppu(io::STAT, self.regs.stat_value());
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.regs.mode
    }

    #[must_use]
    pub fn ly(&self) -> u8 {
        self.regs.ly
    }

    #[must_use]
    pub fn line_cycle(&self) -> u32 {
        self.regs.line_cycle
    }

    #[must_use]
    pub fn registers(&self) -> &PpuRegisters {
        &self.regs
    }

    /// The most recently completed frame.
    #[must_use]
    pub fn frame(&self) -> &FrameBuffer {
        &self.latest
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// A new subscriber to completed frames.
    #[must_use]
    pub fn subscribe(&self) -> Subscriber<FrameBuffer> {
        self.publisher.subscribe()
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Observable for Ppu {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "mode" => Some(self.regs.mode.name().into()),
            "ly" => Some(self.regs.ly.into()),
            "line_cycle" => Some(self.regs.line_cycle.into()),
            "window_line" => Some(self.regs.window_line.into()),
            "lcd_on" => Some(self.enabled.into()),
            "frame_count" => Some(self.frame_count.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["mode", "ly", "line_cycle", "window_line", "lcd_on", "frame_count"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CYCLES_PER_FRAME;
    use crate::ppu::registers::{lcdc, stat};
    use crate::testing::bus_with_program;

    fn setup() -> (GbBus, Ppu) {
        let mut bus = bus_with_program(&[]);
        bus.write(io::IF, 0);
        (bus, Ppu::new())
    }

    fn requested(bus: &GbBus) -> u8 {
        bus.read(io::IF) & 0x1F
    }

    #[test]
    fn visible_line_is_20_43_51() {
        let (mut bus, mut ppu) = setup();
        ppu.tick_n(&mut bus, 19);
        assert_eq!(ppu.mode(), Mode::OamScan);
        ppu.tick(&mut bus);
        assert_eq!(ppu.mode(), Mode::PixelTransfer);
        ppu.tick_n(&mut bus, 42);
        assert_eq!(ppu.mode(), Mode::PixelTransfer);
        ppu.tick(&mut bus);
        assert_eq!(ppu.mode(), Mode::HBlank);
        assert_eq!(bus.read(io::STAT) & stat::MODE_MASK, Mode::HBlank.bits());
        ppu.tick_n(&mut bus, 50);
        assert_eq!(ppu.mode(), Mode::HBlank);
        assert_eq!(ppu.ly(), 0);
        ppu.tick(&mut bus);
        assert_eq!(ppu.mode(), Mode::OamScan);
        assert_eq!(ppu.ly(), 1);
        assert_eq!(bus.read(io::LY), 1);
        assert_eq!(ppu.line_cycle(), 0);
    }

    #[test]
    fn frame_is_17556_cycles() {
        let (mut bus, mut ppu) = setup();
        let mut frames = ppu.subscribe();
        ppu.tick_n(&mut bus, 144 * CYCLES_PER_LINE);
        assert_eq!(ppu.ly(), 144);
        assert_eq!(ppu.mode(), Mode::VBlank);
        assert_eq!(requested(&bus), Interrupt::VBlank.mask());
        assert_eq!(ppu.frame_count(), 1);

        ppu.tick_n(&mut bus, CYCLES_PER_FRAME - 144 * CYCLES_PER_LINE);
        assert_eq!(ppu.ly(), 0);
        assert_eq!(ppu.mode(), Mode::OamScan);
        assert_eq!(ppu.frame_count(), 1);
        let (sequence, frame) = frames.try_latest().expect("one frame");
        assert_eq!(sequence, 1);
        assert_eq!(frame.width, 160);
        assert_eq!(frame.height, 144);
        assert!(frames.try_latest().is_none());
    }

    #[test]
    fn lyc_match_interrupts_once_per_line() {
        let (mut bus, mut ppu) = setup();
        bus.write(io::LYC, 2);
        bus.write(io::STAT, stat::LYC_SOURCE);
        ppu.tick_n(&mut bus, 2 * CYCLES_PER_LINE - 1);
        assert_eq!(requested(&bus), 0);
        ppu.tick(&mut bus);
        assert_eq!(requested(&bus), Interrupt::Stat.mask());
        assert_ne!(bus.read(io::STAT) & stat::COINCIDENCE, 0);

        bus.write(io::IF, 0);
        ppu.tick_n(&mut bus, CYCLES_PER_LINE - 1);
        assert_eq!(requested(&bus), 0, "mode changes within the line do not re-fire");
    }

    #[test]
    fn hblank_source_fires_on_each_entry() {
        let (mut bus, mut ppu) = setup();
        bus.write(io::STAT, stat::HBLANK_SOURCE);
        ppu.tick_n(&mut bus, TRANSFER_END);
        assert_eq!(requested(&bus), Interrupt::Stat.mask());
        bus.write(io::IF, 0);
        ppu.tick_n(&mut bus, CYCLES_PER_LINE - TRANSFER_END);
        assert_eq!(requested(&bus), 0);
        ppu.tick_n(&mut bus, TRANSFER_END);
        assert_eq!(requested(&bus), Interrupt::Stat.mask());
    }

    #[test]
    fn lcd_off_parks_at_line_zero() {
        let (mut bus, mut ppu) = setup();
        ppu.tick_n(&mut bus, 3 * CYCLES_PER_LINE + 30);
        bus.write(io::LCDC, 0x11);
        ppu.tick(&mut bus);
        assert_eq!(ppu.ly(), 0);
        assert_eq!(ppu.mode(), Mode::HBlank);
        assert_eq!(bus.read(io::LY), 0);
        assert_eq!(bus.read(io::STAT) & stat::MODE_MASK, 0);

        bus.write(io::IF, 0);
        ppu.tick_n(&mut bus, CYCLES_PER_FRAME);
        assert_eq!(ppu.frame_count(), 0);
        assert_eq!(requested(&bus), 0);

        bus.write(io::LCDC, 0x91);
        ppu.tick(&mut bus);
        assert_eq!(ppu.mode(), Mode::OamScan);
        assert_eq!(ppu.line_cycle(), 1);
    }

    #[test]
    fn background_tile_reaches_the_frame() {
        let (mut bus, mut ppu) = setup();
        bus.write(io::LCDC, lcdc::LCD_ON | lcdc::UNSIGNED_TILE_DATA | lcdc::BG_ON);
        bus.write(io::BGP, 0xE4);
        for row in 0..8 {
            bus.write(0x8010 + row * 2, 0xFF);
            bus.write(0x8011 + row * 2, 0xFF);
        }
        bus.write(0x9800, 1);
        ppu.tick_n(&mut bus, CYCLES_PER_FRAME);
        let frame = ppu.frame();
        assert_eq!(frame.pixel(0, 0), 3);
        assert_eq!(frame.pixel(7, 7), 3);
        assert_eq!(frame.pixel(8, 0), 0);
        assert_eq!(frame.pixel(0, 8), 0);
    }

    #[test]
    fn queries() {
        let (mut bus, mut ppu) = setup();
        ppu.tick_n(&mut bus, CYCLES_PER_LINE + 25);
        assert_eq!(ppu.query("ly"), Some(Value::U8(1)));
        assert_eq!(ppu.query("mode"), Some(Value::Text("PixelTransfer".into())));
        assert_eq!(ppu.query("nope"), None);
    }
}
