//! Components advanced one machine cycle at a time.

/// A component with its own notion of elapsed time.
///
/// Peripherals that count cycles independently of the CPU (serial shift
/// clocks, cartridge real-time clocks) implement this; the bus calls
/// `tick` once per machine cycle it spends.
pub trait Tickable {
    /// Advance by one machine cycle.
    fn tick(&mut self);

    /// Advance by `count` machine cycles.
    ///
    /// Implementations may override this but must match repeated `tick()`.
    fn tick_n(&mut self, count: u32) {
        for _ in 0..count {
            self.tick();
        }
    }
}
