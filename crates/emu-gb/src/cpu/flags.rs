//! Flag bits in the upper nibble of F.

use crate::bits::BitExt;

/// Zero flag (bit 7).
pub const ZF: u8 = 0b1000_0000;
/// Subtract flag (bit 6) - set if the last operation subtracted.
pub const NF: u8 = 0b0100_0000;
/// Half-carry flag (bit 5) - carry out of bit 3 (bit 11 for 16-bit adds).
pub const HF: u8 = 0b0010_0000;
/// Carry flag (bit 4).
pub const CF: u8 = 0b0001_0000;

/// Bit positions, for use with [`BitExt`].
pub const ZERO_BIT: u8 = 7;
pub const SUBTRACT_BIT: u8 = 6;
pub const HALF_CARRY_BIT: u8 = 5;
pub const CARRY_BIT: u8 = 4;

/// Build a flags byte from four booleans.
#[must_use]
#[allow(clippy::fn_params_excessive_bools)]
pub fn pack(z: bool, n: bool, h: bool, c: bool) -> u8 {
    0u8.with_bit(ZERO_BIT, z)
        .with_bit(SUBTRACT_BIT, n)
        .with_bit(HALF_CARRY_BIT, h)
        .with_bit(CARRY_BIT, c)
}

/// Apply a tri-state update to a flags byte: `None` leaves the bit as is.
#[must_use]
pub fn update(f: u8, z: Option<bool>, n: Option<bool>, h: Option<bool>, c: Option<bool>) -> u8 {
    let mut f = f;
    for (bit, value) in [
        (ZERO_BIT, z),
        (SUBTRACT_BIT, n),
        (HALF_CARRY_BIT, h),
        (CARRY_BIT, c),
    ] {
        if let Some(on) = value {
            f = f.with_bit(bit, on);
        }
    }
    f & 0xF0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_orders_bits() {
        assert_eq!(pack(true, false, false, false), ZF);
        assert_eq!(pack(false, true, true, true), NF | HF | CF);
    }

    #[test]
    fn unchanged_flags_keep_their_bits() {
        let f = ZF | CF;
        assert_eq!(update(f, None, Some(true), None, None), ZF | NF | CF);
        assert_eq!(update(f, Some(false), None, None, None), CF);
        assert_eq!(update(f, None, None, None, None), f);
    }
}
