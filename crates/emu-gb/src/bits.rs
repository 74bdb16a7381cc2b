//! Bit test/set/reset helpers over a byte.
//!
//! Flags, LCDC/STAT decoding, the joypad matrix and the single-bit
//! instructions all go through these, so bit numbering is defined once:
//! bit 0 is the least significant.

/// Bit manipulation on a `u8`. Bit indices are taken modulo 8.
pub trait BitExt: Copy {
    /// True if bit `n` is set.
    fn bit(self, n: u8) -> bool;

    /// Copy of `self` with bit `n` set.
    #[must_use]
    fn set_bit(self, n: u8) -> Self;

    /// Copy of `self` with bit `n` cleared.
    #[must_use]
    fn reset_bit(self, n: u8) -> Self;

    /// Copy of `self` with bit `n` forced to `on`.
    #[must_use]
    fn with_bit(self, n: u8, on: bool) -> Self {
        if on { self.set_bit(n) } else { self.reset_bit(n) }
    }
}

impl BitExt for u8 {
    #[inline]
    fn bit(self, n: u8) -> bool {
        self & (1 << (n & 7)) != 0
    }

    #[inline]
    fn set_bit(self, n: u8) -> Self {
        self | (1 << (n & 7))
    }

    #[inline]
    fn reset_bit(self, n: u8) -> Self {
        self & !(1 << (n & 7))
    }
}
