//! Calendar date and time
//!
//! Integer-only civil calendar conversion (proleptic Gregorian), so a
//! timestamp can be shifted across day, month and year boundaries without
//! a time library.

/// Seconds per day
const SECS_PER_DAY: i64 = 86_400;

/// Days between 0000-03-01 and 1970-01-01
const EPOCH_SHIFT_DAYS: i64 = 719_468;

/// Calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Date {
    year: u16,
    month: u8,
    day: u8,
}

impl Date {
    /// Create a date, rejecting impossible days (e.g. February 30)
    pub fn new(year: u16, month: u8, day: u8) -> Option<Self> {
        if !(DateTime::MIN_YEAR..=DateTime::MAX_YEAR).contains(&year) {
            return None;
        }
        if !(1..=12).contains(&month) {
            return None;
        }
        if day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(Self { year, month, day })
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    /// Days since 1970-01-01
    fn days_since_epoch(&self) -> i64 {
        let month = self.month as i64;
        let year = self.year as i64 - if month <= 2 { 1 } else { 0 };
        let era = (if year >= 0 { year } else { year - 399 }) / 400;
        let year_of_era = year - era * 400;
        let month_index = if month > 2 { month - 3 } else { month + 9 };
        let day_of_year = (153 * month_index + 2) / 5 + self.day as i64 - 1;
        let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
        era * 146_097 + day_of_era - EPOCH_SHIFT_DAYS
    }

    /// Inverse of [`Date::days_since_epoch`]
    fn from_days_since_epoch(days: i64) -> Option<Self> {
        let z = days + EPOCH_SHIFT_DAYS;
        let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
        let day_of_era = z - era * 146_097;
        let year_of_era =
            (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
        let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
        let month_index = (5 * day_of_year + 2) / 153;
        let day = day_of_year - (153 * month_index + 2) / 5 + 1;
        let month = if month_index < 10 {
            month_index + 3
        } else {
            month_index - 9
        };
        let year = year_of_era + era * 400 + if month <= 2 { 1 } else { 0 };

        let year = u16::try_from(year).ok()?;
        Self::new(year, month as u8, day as u8)
    }
}

/// Calendar date and time of day, second resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    date: Date,
    hour: u8,
    minute: u8,
    second: u8,
}

impl DateTime {
    /// Earliest representable year
    pub const MIN_YEAR: u16 = 1970;

    /// Latest representable year (four-digit timestamps)
    pub const MAX_YEAR: u16 = 9999;

    /// 1970-01-01T00:00:00
    pub const UNIX_EPOCH: Self = Self {
        date: Date {
            year: 1970,
            month: 1,
            day: 1,
        },
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Create a date-time from its calendar fields
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Option<Self> {
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(Self {
            date: Date::new(year, month, day)?,
            hour,
            minute,
            second,
        })
    }

    /// Create a date-time from seconds since 1970-01-01T00:00:00Z
    pub fn from_unix_seconds(secs: i64) -> Option<Self> {
        let days = secs.div_euclid(SECS_PER_DAY);
        let rem = secs.rem_euclid(SECS_PER_DAY);

        Some(Self {
            date: Date::from_days_since_epoch(days)?,
            hour: (rem / 3600) as u8,
            minute: ((rem % 3600) / 60) as u8,
            second: (rem % 60) as u8,
        })
    }

    /// Seconds since 1970-01-01T00:00:00Z
    pub fn to_unix_seconds(&self) -> i64 {
        self.date.days_since_epoch() * SECS_PER_DAY
            + self.hour as i64 * 3600
            + self.minute as i64 * 60
            + self.second as i64
    }

    /// Shift by a signed number of seconds
    ///
    /// Returns `None` if the result leaves the representable year range.
    pub fn checked_add_seconds(&self, secs: i64) -> Option<Self> {
        Self::from_unix_seconds(self.to_unix_seconds().checked_add(secs)?)
    }

    pub fn date(&self) -> Date {
        self.date
    }

    pub fn year(&self) -> u16 {
        self.date.year
    }

    pub fn month(&self) -> u8 {
        self.date.month
    }

    pub fn day(&self) -> u8 {
        self.date.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }
}

/// Check for a Gregorian leap year
pub const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in the given month (1-12)
pub const fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}
