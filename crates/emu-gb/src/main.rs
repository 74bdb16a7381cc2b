//! Headless Game Boy runner.
//!
//! Runs a ROM for a number of frames on a worker thread, then optionally
//! writes a screenshot, the battery RAM and the serial output.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use clap::Parser;
use emu_gb::{GameBoy, GbButton, GbConfig, GbError, capture, config};
use log::{LevelFilter, Log, Metadata, Record};

/// How long to wait for a frame before assuming the LCD was left off.
const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Frames a scripted press is held for.
const PRESS_FRAMES: u64 = 5;

/// Game Boy emulator (headless)
#[derive(Parser, Debug)]
#[command(name = "emu-gb")]
#[command(about = "Run a Game Boy ROM headless", long_about = None)]
struct Args {
    /// Cartridge image (.gb)
    #[arg(short, long)]
    rom: PathBuf,

    /// Number of frames to run
    #[arg(short, long, default_value_t = 300)]
    frames: u64,

    /// Battery RAM file: loaded before running, written back after
    #[arg(long)]
    save: Option<PathBuf>,

    /// Write the last frame as a PNG
    #[arg(long)]
    screenshot: Option<PathBuf>,

    /// Print bytes sent through the serial port
    #[arg(long)]
    serial: bool,

    /// Scripted button press, e.g. `start@60`
    #[arg(long = "press", value_name = "BUTTON@FRAME", value_parser = parse_press)]
    presses: Vec<Press>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,
}

/// A button pressed at the start of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Press {
    button: GbButton,
    frame: u64,
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn parse_press(text: &str) -> Result<Press, String> {
    let (name, frame) = text
        .split_once('@')
        .ok_or_else(|| format!("expected BUTTON@FRAME, got \"{text}\""))?;
    let button = GbButton::from_name(name).ok_or_else(|| format!("unknown button \"{name}\""))?;
    let frame = frame.parse().map_err(|e| format!("bad frame \"{frame}\": {e}"))?;
    Ok(Press { button, frame })
}

fn make_gameboy(args: &Args) -> GameBoy {
    let rom_data = match fs::read(&args.rom) {
        Ok(data) => data,
        Err(e) => {
            log::error!("cannot read {}: {e}", args.rom.display());
            process::exit(1);
        }
    };
    let save_data = args.save.as_ref().filter(|path| path.exists()).and_then(|path| {
        fs::read(path)
            .inspect_err(|e| log::warn!("cannot read {}: {e}", path.display()))
            .ok()
    });

    let config = GbConfig { rom_data, save_data };
    let mut gb = match GameBoy::new(&config) {
        Ok(gb) => gb,
        Err(_) => process::exit(1),
    };

    for press in &args.presses {
        gb.input_queue().enqueue_button(press.button, press.frame, PRESS_FRAMES);
    }
    gb
}

/// Run until `frames` frames have been published or the machine faults.
fn run(mut gb: GameBoy, frames: u64) -> (GameBoy, Result<u64, GbError>) {
    let cancel = Arc::new(AtomicBool::new(false));
    let mut subscriber = gb.subscribe_frames();

    let worker_cancel = Arc::clone(&cancel);
    let worker = thread::spawn(move || {
        let result = gb.run_until_cancelled(&worker_cancel);
        (gb, result)
    });

    while frames > 0 {
        match subscriber.wait_next(FRAME_TIMEOUT) {
            Some((sequence, _)) if sequence >= frames => break,
            Some(_) => {}
            None if subscriber.is_closed() => break,
            None => {
                log::warn!("no frame for {}s, stopping", FRAME_TIMEOUT.as_secs());
                break;
            }
        }
    }
    cancel.store(true, Ordering::Relaxed);

    match worker.join() {
        Ok(outcome) => outcome,
        Err(_) => {
            log::error!("emulation thread panicked");
            process::exit(1);
        }
    }
}

fn main() {
    let args = Args::parse();
    log::set_max_level(args.log_level);
    if log::set_logger(&LOGGER).is_err() {
        eprintln!("logger already installed");
    }

    let gb = make_gameboy(&args);
    let (mut gb, result) = run(gb, args.frames);
    let mut failed = false;
    match result {
        Ok(_) => eprintln!(
            "Ran {} frames ({} machine cycles, {} ms emulated)",
            gb.ppu().frame_count(),
            gb.cycles(),
            config::CLOCK.nanos_for(gb.cycles()) / 1_000_000
        ),
        Err(e) => {
            log::error!("emulation stopped: {e}");
            failed = true;
        }
    }

    if let Some(path) = &args.screenshot {
        match capture::save_screenshot(gb.frame(), path) {
            Ok(()) => eprintln!("Screenshot saved to {}", path.display()),
            Err(e) => {
                log::error!("screenshot: {e}");
                failed = true;
            }
        }
    }

    if let (Some(path), Some(data)) = (&args.save, gb.save_data()) {
        if let Err(e) = fs::write(path, data) {
            log::error!("cannot write {}: {e}", path.display());
            failed = true;
        }
    }

    if args.serial {
        let mut stdout = io::stdout().lock();
        if stdout.write_all(&gb.take_serial_output()).and_then(|()| stdout.flush()).is_err() {
            failed = true;
        }
    }

    if failed {
        process::exit(1);
    }
}
