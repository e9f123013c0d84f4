//! Session identity and log file naming

use core::fmt::Write;

use heapless::String;

use crate::clock::Date;

/// Longest logical filename: `record_YYYYMMDD_SSS.csv`
pub const FILENAME_LEN: usize = 32;

/// Logical log filename
pub type FileName = String<FILENAME_LEN>;

/// Identity of one boot session
///
/// Fixed for the lifetime of a power-on cycle. Two sessions on the same
/// date are told apart by the sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionIdentity {
    date: Date,
    sequence: u8,
}

impl SessionIdentity {
    pub fn new(date: Date, sequence: u8) -> Self {
        Self { date, sequence }
    }

    pub fn date(&self) -> Date {
        self.date
    }

    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    /// Logical filename, `record_<YYYYMMDD>_<seq:03>.csv`
    pub fn filename(&self) -> FileName {
        let mut name = FileName::new();
        // 24 characters always fit
        let _ = write!(
            name,
            "record_{:04}{:02}{:02}_{:03}.csv",
            self.date.year(),
            self.date.month(),
            self.date.day(),
            self.sequence
        );
        name
    }

    /// Per-day directory for 8.3-only filesystems, `<YYYYMMDD>`
    pub fn day_directory(&self) -> String<8> {
        let mut name = String::new();
        let _ = write!(
            name,
            "{:04}{:02}{:02}",
            self.date.year(),
            self.date.month(),
            self.date.day()
        );
        name
    }

    /// 8.3 filename within [`SessionIdentity::day_directory`], `REC_<seq:03>.CSV`
    pub fn short_file_name(&self) -> String<12> {
        let mut name = String::new();
        let _ = write!(name, "REC_{:03}.CSV", self.sequence);
        name
    }
}
