//! Emulation errors.

use thiserror::Error;

/// Errors surfaced by the core.
///
/// Hardware "don't care" conditions (unusable memory, disabled cartridge
/// RAM) are not errors; they read back sentinel bytes instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GbError {
    /// The image cannot even hold the cartridge header.
    #[error("ROM image is {len} bytes, too short for a cartridge header")]
    RomTooShort { len: usize },

    /// ROM size code at 0x0148 outside the known table.
    #[error("unknown ROM size code {0:#04X}")]
    UnknownRomSize(u8),

    /// RAM size code at 0x0149 outside the known table.
    #[error("unknown RAM size code {0:#04X}")]
    UnknownRamSize(u8),

    /// An opcode with no defined behaviour was fetched. Emulation stops.
    #[error("illegal opcode {opcode:#04X} at {pc:#06X}")]
    IllegalOpcode { opcode: u8, pc: u16 },

    /// Save bytes do not match the cartridge RAM size.
    #[error("save data is {actual} bytes, cartridge RAM is {expected} bytes")]
    SaveDataSize { expected: usize, actual: usize },
}
