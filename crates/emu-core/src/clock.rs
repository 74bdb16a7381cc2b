//! Master clock configuration.

/// Master crystal of a machine.
///
/// The CPU bus runs at a fixed division of the crystal (a "machine
/// cycle"); everything else in the core is counted in machine cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Crystal frequency in Hz (e.g. `4_194_304` for the DMG handheld).
    pub frequency_hz: u64,
    /// Crystal ticks per machine cycle.
    pub ticks_per_machine_cycle: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64, ticks_per_machine_cycle: u64) -> Self {
        Self {
            frequency_hz,
            ticks_per_machine_cycle,
        }
    }

    /// Machine cycles per emulated second.
    #[must_use]
    pub const fn machine_cycles_per_second(&self) -> u64 {
        self.frequency_hz / self.ticks_per_machine_cycle
    }

    /// Emulated duration of `machine_cycles`, in nanoseconds.
    #[must_use]
    pub const fn nanos_for(&self, machine_cycles: u64) -> u64 {
        machine_cycles * self.ticks_per_machine_cycle * 1_000_000_000 / self.frequency_hz
    }
}
