//! MBC3: 7-bit ROM bank, 4 RAM banks, optional real-time clock.
//!
//! - 0x0000-0x1FFF: RAM and clock enable (low nibble 0xA)
//! - 0x2000-0x3FFF: ROM bank, 0 selects 1
//! - 0x4000-0x5FFF: 0x00-0x03 map a RAM bank, 0x08-0x0C map a clock register
//! - 0x6000-0x7FFF: writing 0x00 then 0x01 latches the clock

use emu_core::Tickable;

use super::{Banks, Cartridge, CartridgeHeader};
use crate::bits::BitExt;
use crate::config::CLOCK;

const DAY_HIGH_BIT: u8 = 0;
const HALT_BIT: u8 = 6;
const DAY_CARRY_BIT: u8 = 7;

/// Clock chip counting emulated time.
///
/// Registers, in select order 0x08-0x0C: seconds, minutes, hours, day
/// counter low byte, and a control byte holding day bit 8, the halt flag
/// and the day-counter carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealTimeClock {
    registers: [u8; 5],
    latched: [u8; 5],
    sub_second: u64,
}

impl RealTimeClock {
    #[must_use]
    pub fn halted(&self) -> bool {
        self.registers[4].bit(HALT_BIT)
    }

    /// Latched value of register `select` (0x08-0x0C).
    #[must_use]
    pub fn read(&self, select: u8) -> u8 {
        self.latched
            .get(usize::from(select.wrapping_sub(0x08)))
            .copied()
            .unwrap_or(0xFF)
    }

    /// Set live register `select` (0x08-0x0C).
    pub fn write(&mut self, select: u8, value: u8) {
        let index = usize::from(select.wrapping_sub(0x08));
        let masked = match index {
            0 | 1 => value & 0x3F,
            2 => value & 0x1F,
            3 => value,
            4 => value & 0xC1,
            _ => return,
        };
        if index == 0 {
            self.sub_second = 0;
        }
        self.registers[index] = masked;
    }

    /// Copy the live registers into the readable latch.
    pub fn latch(&mut self) {
        self.latched = self.registers;
    }

    fn days(&self) -> u16 {
        u16::from(self.registers[4] & 1) << 8 | u16::from(self.registers[3])
    }

    fn advance_second(&mut self) {
        let [seconds, minutes, hours, ..] = &mut self.registers;
        *seconds = (*seconds + 1) & 0x3F;
        if *seconds != 60 {
            return;
        }
        *seconds = 0;
        *minutes = (*minutes + 1) & 0x3F;
        if *minutes != 60 {
            return;
        }
        *minutes = 0;
        *hours = (*hours + 1) & 0x1F;
        if *hours != 24 {
            return;
        }
        *hours = 0;

        let days = self.days() + 1;
        let mut control = self.registers[4].with_bit(DAY_HIGH_BIT, days & 0x100 != 0);
        if days > 0x1FF {
            control = control.set_bit(DAY_CARRY_BIT).reset_bit(DAY_HIGH_BIT);
        }
        self.registers[3] = days as u8;
        self.registers[4] = control;
    }
}

impl Tickable for RealTimeClock {
    fn tick(&mut self) {
        if self.halted() {
            return;
        }
        self.sub_second += 1;
        if self.sub_second == CLOCK.machine_cycles_per_second() {
            self.sub_second = 0;
            self.advance_second();
        }
    }
}

pub struct Mbc3 {
    header: CartridgeHeader,
    banks: Banks,
    rtc: Option<RealTimeClock>,
    /// 0x00-0x03 for RAM, 0x08-0x0C for a clock register.
    select: u8,
    latch_armed: bool,
}

impl Mbc3 {
    #[must_use]
    pub fn new(header: CartridgeHeader, image: &[u8]) -> Self {
        let banks = Banks::new(&header, image);
        let rtc = header.has_timer.then(RealTimeClock::default);
        Self {
            header,
            banks,
            rtc,
            select: 0,
            latch_armed: false,
        }
    }

    #[must_use]
    pub fn rom_bank(&self) -> usize {
        self.banks.rom.active_bank()
    }

    #[must_use]
    pub fn rtc(&self) -> Option<&RealTimeClock> {
        self.rtc.as_ref()
    }

    fn clock_selected(&self) -> bool {
        (0x08..=0x0C).contains(&self.select)
    }
}

impl Cartridge for Mbc3 {
    fn read_rom(&self, address: u16) -> u8 {
        self.banks.read_rom(address)
    }

    fn write_control(&mut self, address: u16, value: u8) {
        match address {
            0x0000..=0x1FFF => self.banks.latch_ram_enable(value),
            0x2000..=0x3FFF => {
                let bank = usize::from(value & 0x7F).max(1);
                self.banks.rom.set_active_bank(bank);
                log::trace!("MBC3 ROM bank {}", self.banks.rom.active_bank());
            }
            0x4000..=0x5FFF => {
                self.select = value & 0x0F;
                if self.select <= 0x03 {
                    self.banks.ram.set_active_bank(usize::from(self.select));
                }
            }
            0x6000..=0x7FFF => {
                if self.latch_armed && value == 0x01 {
                    if let Some(rtc) = &mut self.rtc {
                        rtc.latch();
                    }
                }
                self.latch_armed = value == 0x00;
            }
            _ => {}
        }
    }

    fn read_ram(&self, address: u16) -> u8 {
        if !self.clock_selected() {
            return self.banks.read_ram(address);
        }
        match &self.rtc {
            Some(rtc) if self.banks.ram_enabled => rtc.read(self.select),
            _ => 0xFF,
        }
    }

    fn write_ram(&mut self, address: u16, value: u8) {
        if !self.clock_selected() {
            self.banks.write_ram(address, value);
            return;
        }
        if let Some(rtc) = &mut self.rtc {
            if self.banks.ram_enabled {
                rtc.write(self.select, value);
            }
        }
    }

    fn ram_enabled(&self) -> bool {
        self.banks.ram_enabled
    }

    fn header(&self) -> &CartridgeHeader {
        &self.header
    }

    fn ram(&self) -> &[u8] {
        self.banks.ram.as_bytes()
    }

    fn ram_mut(&mut self) -> &mut [u8] {
        self.banks.ram.as_bytes_mut()
    }

    fn tick(&mut self) {
        if let Some(rtc) = &mut self.rtc {
            rtc.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::rom_image;

    fn mbc3_with_clock() -> Mbc3 {
        let image = rom_image(0x10, 8, 3, &[]);
        let header = CartridgeHeader::parse(&image).expect("valid header");
        let mut mbc = Mbc3::new(header, &image);
        mbc.write_control(0x0000, 0x0A);
        mbc
    }

    fn latch(mbc: &mut Mbc3) {
        mbc.write_control(0x6000, 0x00);
        mbc.write_control(0x6000, 0x01);
    }

    #[test]
    fn seven_bit_rom_bank() {
        let mut mbc = mbc3_with_clock();
        mbc.write_control(0x2000, 0x00);
        assert_eq!(mbc.rom_bank(), 1);
        mbc.write_control(0x2000, 0x05);
        assert_eq!(mbc.read_rom(0x4000), 5);
    }

    #[test]
    fn clock_counts_emulated_seconds_through_latch() {
        let mut mbc = mbc3_with_clock();
        let per_second = u32::try_from(CLOCK.machine_cycles_per_second()).expect("fits");
        for _ in 0..61 {
            mbc.rtc.as_mut().expect("clock fitted").tick_n(per_second);
        }

        mbc.write_control(0x4000, 0x08);
        assert_eq!(mbc.read_ram(0xA000), 0, "not latched yet");
        latch(&mut mbc);
        assert_eq!(mbc.read_ram(0xA000), 1);
        mbc.write_control(0x4000, 0x09);
        assert_eq!(mbc.read_ram(0xA000), 1);
    }

    #[test]
    fn halted_clock_stands_still() {
        let mut mbc = mbc3_with_clock();
        mbc.write_control(0x4000, 0x0C);
        mbc.write_ram(0xA000, 0x40);
        let per_second = u32::try_from(CLOCK.machine_cycles_per_second()).expect("fits");
        mbc.rtc.as_mut().expect("clock fitted").tick_n(per_second * 3);
        latch(&mut mbc);
        mbc.write_control(0x4000, 0x08);
        assert_eq!(mbc.read_ram(0xA000), 0);
    }

    #[test]
    fn day_counter_overflow_sets_carry() {
        let mut rtc = RealTimeClock::default();
        rtc.write(0x08, 59);
        rtc.write(0x09, 59);
        rtc.write(0x0A, 23);
        rtc.write(0x0B, 0xFF);
        rtc.write(0x0C, 0x01);
        rtc.advance_second();
        rtc.latch();
        assert_eq!(rtc.read(0x0B), 0x00);
        assert_eq!(rtc.read(0x0C), 0x80);
    }

    #[test]
    fn ram_banks_still_work_alongside_clock() {
        let mut mbc = mbc3_with_clock();
        mbc.write_control(0x4000, 0x02);
        mbc.write_ram(0xA010, 0x99);
        assert_eq!(mbc.ram()[2 * 0x2000 + 0x10], 0x99);
        mbc.write_control(0x4000, 0x08);
        assert_ne!(mbc.read_ram(0xA010), 0x99);
    }
}
