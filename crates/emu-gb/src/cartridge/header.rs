//! Cartridge header at 0x0100-0x014F.

use crate::error::GbError;

const TITLE: std::ops::Range<usize> = 0x0134..0x0144;
const CGB_FLAG: usize = 0x0143;
const CARTRIDGE_TYPE: usize = 0x0147;
const ROM_SIZE: usize = 0x0148;
const RAM_SIZE: usize = 0x0149;
const HEADER_CHECKSUM: usize = 0x014D;

/// Smallest image that contains a complete header.
pub const HEADER_END: usize = 0x0150;

/// Bank-controller family selected by the cartridge-type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    RomOnly,
    Mbc1,
    Mbc3,
    Mbc5,
}

/// Colour-hardware support advertised at 0x0143.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgbSupport {
    None,
    /// Runs on both; DMG mode is used here.
    Enhanced,
    /// Refuses to run on DMG hardware. Loaded anyway, with a warning.
    Required,
}

/// Parsed header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartridgeHeader {
    pub title: String,
    pub cgb: CgbSupport,
    pub cartridge_type: u8,
    pub controller: ControllerKind,
    pub rom_banks: usize,
    pub ram_banks: usize,
    pub has_battery: bool,
    pub has_timer: bool,
    pub checksum_ok: bool,
}

impl CartridgeHeader {
    /// Parse the header of `rom`.
    ///
    /// Unknown cartridge types fall back to [`ControllerKind::RomOnly`];
    /// unknown size codes are a malformed header.
    pub fn parse(rom: &[u8]) -> Result<Self, GbError> {
        if rom.len() < HEADER_END {
            return Err(GbError::RomTooShort { len: rom.len() });
        }

        let title = rom[TITLE]
            .iter()
            .take_while(|&&b| b != 0)
            .filter(|b| b.is_ascii_graphic() || **b == b' ')
            .map(|&b| char::from(b))
            .collect::<String>()
            .trim_end()
            .to_owned();

        let cgb = match rom[CGB_FLAG] {
            0xC0 => CgbSupport::Required,
            0x80 => CgbSupport::Enhanced,
            _ => CgbSupport::None,
        };

        let cartridge_type = rom[CARTRIDGE_TYPE];
        let (controller, has_battery, has_timer) = match cartridge_type {
            0x00 | 0x08 => (ControllerKind::RomOnly, false, false),
            0x09 => (ControllerKind::RomOnly, true, false),
            0x01 | 0x02 => (ControllerKind::Mbc1, false, false),
            0x03 => (ControllerKind::Mbc1, true, false),
            0x0F | 0x10 => (ControllerKind::Mbc3, true, true),
            0x11 | 0x12 => (ControllerKind::Mbc3, false, false),
            0x13 => (ControllerKind::Mbc3, true, false),
            0x19 | 0x1A | 0x1C | 0x1D => (ControllerKind::Mbc5, false, false),
            0x1B | 0x1E => (ControllerKind::Mbc5, true, false),
            other => {
                log::warn!("unsupported cartridge type {other:#04X}, using no banking");
                (ControllerKind::RomOnly, false, false)
            }
        };

        let rom_banks = match rom[ROM_SIZE] {
            code @ 0x00..=0x08 => 2usize << code,
            0x52 => 72,
            0x53 => 80,
            0x54 => 96,
            code => return Err(GbError::UnknownRomSize(code)),
        };

        let ram_banks = match rom[RAM_SIZE] {
            0x00 => 0,
            // 2 KiB parts are stored in a whole 8 KiB bank.
            0x01 | 0x02 => 1,
            0x03 => 4,
            0x04 => 16,
            0x05 => 8,
            code => return Err(GbError::UnknownRamSize(code)),
        };

        Ok(Self {
            title,
            cgb,
            cartridge_type,
            controller,
            rom_banks,
            ram_banks,
            has_battery,
            has_timer,
            checksum_ok: header_checksum(rom) == rom[HEADER_CHECKSUM],
        })
    }
}

/// The boot ROM's checksum over 0x0134-0x014C.
#[must_use]
pub fn header_checksum(rom: &[u8]) -> u8 {
    rom[0x0134..=0x014C]
        .iter()
        .fold(0u8, |sum, &b| sum.wrapping_sub(b).wrapping_sub(1))
}
