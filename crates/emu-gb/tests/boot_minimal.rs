//! Minimal Game Boy boot tests built from hand-assembled ROMs.
//!
//! Each ROM carries a valid header, jumps from the 0x0100 entry point to
//! 0x0150 and runs a few instructions there. The tests check that the
//! machine services interrupts, publishes frames, wakes from STOP and
//! shifts bytes out of the serial port.

use std::time::Duration;

use emu_gb::cartridge::header_checksum;
use emu_gb::{GameBoy, GbButton, GbConfig};

/// Build a 32 KiB ROM-only image. `vectors` are (address, code) pairs
/// placed below the header; `program` lands at 0x0150.
fn build_rom(vectors: &[(usize, &[u8])], program: &[u8]) -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    for &(address, code) in vectors {
        rom[address..address + code.len()].copy_from_slice(code);
    }
    // 0x0100: NOP; JP 0x0150
    rom[0x0100..0x0104].copy_from_slice(&[0x00, 0xC3, 0x50, 0x01]);
    rom[0x0134..0x0138].copy_from_slice(b"BOOT");
    rom[0x0147] = 0x00; // ROM only
    rom[0x0148] = 0x00; // 32 KiB
    rom[0x0149] = 0x00; // no RAM
    rom[0x014D] = header_checksum(&rom);
    rom[0x0150..0x0150 + program.len()].copy_from_slice(program);
    rom
}

fn boot(vectors: &[(usize, &[u8])], program: &[u8]) -> GameBoy {
    let config = GbConfig::new(build_rom(vectors, program));
    GameBoy::new(&config).expect("ROM should load")
}

#[test]
fn vblank_interrupt_runs_once_per_frame() {
    // VBlank handler at 0x0040: count frames in 0xC000.
    let handler: &[u8] = &[
        0x21, 0x00, 0xC0, // LD HL, 0xC000
        0x34, //             INC (HL)
        0xD9, //             RETI
    ];
    let program: &[u8] = &[
        0x3E, 0x01, // LD A, 0x01
        0xE0, 0xFF, // LDH (IE), A
        0xAF, //       XOR A
        0xE0, 0x0F, // LDH (IF), A
        0xFB, //       EI
        0x76, //       halt: HALT
        0x18, 0xFD, // JR halt
    ];
    let mut gb = boot(&[(0x0040, handler)], program);

    for _ in 0..3 {
        gb.run_frame().expect("no illegal opcodes");
    }

    assert_eq!(gb.bus().read(0xC000), 3, "one VBlank per frame");
    assert_eq!(gb.ppu().frame_count(), 3);
}

#[test]
fn frames_are_published_to_subscribers() {
    let mut gb = boot(&[], &[0x18, 0xFE]); // JR -2
    let mut frames = gb.subscribe_frames();
    assert!(frames.try_latest().is_none());

    gb.run_frame().expect("no illegal opcodes");
    gb.run_frame().expect("no illegal opcodes");

    let (sequence, frame) = frames.wait_next(Duration::from_secs(1)).expect("a frame");
    assert_eq!(sequence, 2);
    assert_eq!((frame.width, frame.height), (160, 144));
    assert_eq!(frame.pixels.len(), 160 * 144);
}

#[test]
fn joypad_press_ends_stop() {
    let program: &[u8] = &[
        0x10, 0x00, //       STOP
        0x3E, 0x42, //       LD A, 0x42
        0xEA, 0x00, 0xC0, // LD (0xC000), A
        0x18, 0xFE, //       JR -2
    ];
    let mut gb = boot(&[], program);

    gb.run_frame().expect("no illegal opcodes");
    assert_eq!(gb.bus().read(0xC000), 0, "still stopped");

    gb.press(GbButton::Start);
    gb.run_frame().expect("no illegal opcodes");
    assert_eq!(gb.bus().read(0xC000), 0x42);
}

#[test]
fn serial_byte_is_captured() {
    let program: &[u8] = &[
        0x3E, 0x48, //       LD A, 'H'
        0xE0, 0x01, //       LDH (SB), A
        0x3E, 0x81, //       LD A, 0x81
        0xE0, 0x02, //       LDH (SC), A
        0xF0, 0x02, //       wait: LDH A, (SC)
        0xCB, 0x7F, //       BIT 7, A
        0x20, 0xFA, //       JR NZ, wait
        0x18, 0xFE, //       JR -2
    ];
    let mut gb = boot(&[], program);

    gb.run_frame().expect("no illegal opcodes");

    assert_eq!(gb.serial_output(), b"H");
}

#[cfg(feature = "native")]
#[test]
fn screenshot_after_boot() {
    let mut gb = boot(&[], &[0x18, 0xFE]);
    gb.run_frame().expect("no illegal opcodes");

    let path = std::env::temp_dir().join(format!("emu-gb-boot-{}.png", std::process::id()));
    emu_gb::capture::save_screenshot(gb.frame(), &path).expect("screenshot");
    assert!(path.exists());
    std::fs::remove_file(&path).ok();
}
