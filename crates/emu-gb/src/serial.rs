//! Serial port (SB 0xFF01, SC 0xFF02) with no link partner.
//!
//! An internal-clock transfer shifts eight bits at 8192 Hz, 128 machine
//! cycles in all. With nothing attached the incoming bits are all 1.

use emu_core::Tickable;

/// Machine cycles for one internal-clock byte transfer.
pub const TRANSFER_CYCLES: u32 = 128;

/// Captured bytes kept before the oldest half is discarded.
pub const OUTPUT_LIMIT: usize = 64 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Serial {
    /// Cycles left in the running transfer, if any.
    remaining: Option<u32>,
    outgoing: u8,
    completed: bool,
    output: Vec<u8>,
}

impl Serial {
    /// SC written with the start and internal-clock bits set.
    pub fn start(&mut self, outgoing: u8) {
        self.outgoing = outgoing;
        self.remaining = Some(TRANSFER_CYCLES);
    }

    #[must_use]
    pub fn transferring(&self) -> bool {
        self.remaining.is_some()
    }

    /// True once per finished transfer.
    pub fn take_completed(&mut self) -> bool {
        std::mem::take(&mut self.completed)
    }

    /// Bytes sent since the last [`Serial::take_output`], at most
    /// [`OUTPUT_LIMIT`] of the most recent.
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    fn capture(&mut self, byte: u8) {
        if self.output.len() >= OUTPUT_LIMIT {
            self.output.drain(..OUTPUT_LIMIT / 2);
            log::debug!("serial capture full, dropped the oldest {} bytes", OUTPUT_LIMIT / 2);
        }
        self.output.push(byte);
    }
}

impl Tickable for Serial {
    fn tick(&mut self) {
        let Some(remaining) = &mut self.remaining else {
            return;
        };
        *remaining -= 1;
        if *remaining == 0 {
            self.remaining = None;
            self.completed = true;
            self.capture(self.outgoing);
            log::trace!("serial out {:#04X}", self.outgoing);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_takes_128_cycles() {
        let mut serial = Serial::default();
        serial.start(b'P');
        serial.tick_n(TRANSFER_CYCLES - 1);
        assert!(serial.transferring());
        assert!(!serial.take_completed());
        serial.tick();
        assert!(serial.take_completed());
        assert!(!serial.take_completed());
        assert_eq!(serial.output(), b"P");
    }

    #[test]
    fn taking_output_drains_it() {
        let mut serial = Serial::default();
        serial.start(b'o');
        serial.tick_n(TRANSFER_CYCLES);
        serial.start(b'k');
        serial.tick_n(TRANSFER_CYCLES);
        assert_eq!(serial.take_output(), b"ok");
        assert!(serial.output().is_empty());
    }

    #[test]
    fn capture_keeps_the_most_recent_bytes() {
        let mut serial = Serial::default();
        for n in 0..=OUTPUT_LIMIT {
            serial.capture(n as u8);
        }
        assert_eq!(serial.output().len(), OUTPUT_LIMIT / 2 + 1);
        assert_eq!(serial.output().last(), Some(&(OUTPUT_LIMIT as u8)));
        assert_eq!(serial.output()[0], (OUTPUT_LIMIT / 2) as u8);
    }

    #[test]
    fn idle_port_does_nothing() {
        let mut serial = Serial::default();
        serial.tick_n(1000);
        assert!(serial.output().is_empty());
    }
}
