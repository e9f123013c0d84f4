//! DS1307 battery-backed real-time clock (I2C)
//!
//! Time is kept in seven BCD registers starting at 0x00:
//!
//! | Reg | Content                                     |
//! |-----|---------------------------------------------|
//! | 00  | CH (bit 7, clock halt) + seconds            |
//! | 01  | minutes                                     |
//! | 02  | hours; bit 6 selects 12 h mode, bit 5 = PM  |
//! | 03  | day of week (1-7)                           |
//! | 04  | date                                        |
//! | 05  | month                                       |
//! | 06  | year within the century                     |
//!
//! The oscillator is stopped while CH is set, which is the state a chip
//! powers up in after losing its backup supply.

use embedded_hal::i2c::I2c;
use kinelog_core::clock::DateTime;
use kinelog_core::traits::{ClockError, ClockSource};

/// Fixed I2C address
pub const ADDRESS: u8 = 0x68;

/// First year the two-digit year register can hold
pub const CENTURY: u16 = 2000;

/// First time register
const REG_SECONDS: u8 = 0x00;

/// Clock halt bit in the seconds register
const CLOCK_HALT: u8 = 0x80;

/// 12-hour mode bit in the hours register
const HOUR_12: u8 = 0x40;

/// PM flag in 12-hour mode
const HOUR_PM: u8 = 0x20;

/// Decode one BCD byte, rejecting non-decimal nibbles
fn from_bcd(value: u8) -> Option<u8> {
    let (hi, lo) = (value >> 4, value & 0x0F);
    if hi > 9 || lo > 9 {
        return None;
    }
    Some(hi * 10 + lo)
}

/// Encode a value below 100 as BCD
fn to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Hours register to 0-23
fn decode_hour(value: u8) -> Option<u8> {
    if value & HOUR_12 == 0 {
        return from_bcd(value & 0x3F);
    }
    let hour = from_bcd(value & 0x1F)?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let pm = value & HOUR_PM != 0;
    Some(hour % 12 + if pm { 12 } else { 0 })
}

/// Day of week, 1 = Sunday
fn day_of_week(time: &DateTime) -> u8 {
    // 1970-01-01 was a Thursday
    let days = time.to_unix_seconds().div_euclid(86_400);
    ((days + 4).rem_euclid(7) + 1) as u8
}

/// DS1307 driver
pub struct Ds1307<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Ds1307<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Release the bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_registers(&mut self) -> Result<[u8; 7], ClockError> {
        let mut regs = [0u8; 7];
        self.i2c
            .write_read(ADDRESS, &[REG_SECONDS], &mut regs)
            .map_err(|_| ClockError::Bus)?;
        Ok(regs)
    }
}

impl<I2C: I2c> ClockSource for Ds1307<I2C> {
    fn is_running(&mut self) -> Result<bool, ClockError> {
        let mut seconds = [0u8; 1];
        self.i2c
            .write_read(ADDRESS, &[REG_SECONDS], &mut seconds)
            .map_err(|_| ClockError::Bus)?;
        Ok(seconds[0] & CLOCK_HALT == 0)
    }

    fn now(&mut self) -> Result<DateTime, ClockError> {
        let regs = self.read_registers()?;

        let decode = || -> Option<DateTime> {
            let second = from_bcd(regs[0] & 0x7F)?;
            let minute = from_bcd(regs[1] & 0x7F)?;
            let hour = decode_hour(regs[2])?;
            let day = from_bcd(regs[4] & 0x3F)?;
            let month = from_bcd(regs[5] & 0x1F)?;
            let year = CENTURY + u16::from(from_bcd(regs[6])?);
            DateTime::new(year, month, day, hour, minute, second)
        };

        decode().ok_or(ClockError::InvalidTime)
    }

    fn adjust(&mut self, time: &DateTime) -> Result<(), ClockError> {
        if !(CENTURY..CENTURY + 100).contains(&time.year()) {
            return Err(ClockError::OutOfRange);
        }

        let frame = [
            REG_SECONDS,
            to_bcd(time.second()), // CH cleared
            to_bcd(time.minute()),
            to_bcd(time.hour()), // 24 h mode
            day_of_week(time),
            to_bcd(time.day()),
            to_bcd(time.month()),
            to_bcd((time.year() - CENTURY) as u8),
        ];

        self.i2c
            .write(ADDRESS, &frame)
            .map_err(|_| ClockError::Bus)
    }
}
