//! CSV sample formatting
//!
//! One row per sample:
//! `<timestamp>,<ax>,<ay>,<az>,<gx>,<gy>,<gz>,<temp>` with every value
//! printed to two decimal places.

use core::fmt::{self, Write};

use heapless::String;

use crate::clock::Timestamp;
use crate::traits::MotionEvent;

/// Header row written once when a log file is created
pub const CSV_HEADER: &str = "Timestamp,AccelX,AccelY,AccelZ,GyroX,GyroY,GyroZ,Temp";

/// Line terminator for every row, header included
pub const LINE_ENDING: &str = "\r\n";

/// Capacity of one formatted row
pub const ROW_LEN: usize = 160;

/// One formatted CSV row, terminator included
pub type CsvRow = String<ROW_LEN>;

/// A timestamped sensor reading
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub event: MotionEvent,
}

impl Sample {
    pub fn new(timestamp: Timestamp, event: MotionEvent) -> Self {
        Self { timestamp, event }
    }

    /// Format as a CSV row ending in [`LINE_ENDING`]
    ///
    /// Fails only if the row does not fit in [`ROW_LEN`], which takes
    /// non-physical readings.
    pub fn to_csv_row(&self) -> Result<CsvRow, fmt::Error> {
        let a = &self.event.acceleration;
        let g = &self.event.gyro;

        let mut row = CsvRow::new();
        write!(
            row,
            "{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}{}",
            self.timestamp,
            a.x,
            a.y,
            a.z,
            g.x,
            g.y,
            g.z,
            self.event.temperature_c,
            LINE_ENDING
        )?;
        Ok(row)
    }
}

/// Header line including its terminator
pub fn header_line() -> String<64> {
    let mut line = String::new();
    // Fixed text, always fits
    let _ = write!(line, "{}{}", CSV_HEADER, LINE_ENDING);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Vector3;

    fn sample(acceleration: Vector3, gyro: Vector3, temperature_c: f32) -> Sample {
        let mut timestamp = Timestamp::new();
        timestamp.push_str("2024-01-01T07:00:00+07:00").unwrap();
        Sample::new(
            timestamp,
            MotionEvent {
                acceleration,
                gyro,
                temperature_c,
            },
        )
    }

    #[test]
    fn test_two_decimal_rounding() {
        let s = sample(Vector3::new(1.005, -2.0, 0.333), Vector3::ZERO, 25.0);
        assert_eq!(
            s.to_csv_row().unwrap().as_str(),
            "2024-01-01T07:00:00+07:00,1.00,-2.00,0.33,0.00,0.00,0.00,25.00\r\n"
        );
    }

    #[test]
    fn test_row_has_eight_fields() {
        let s = sample(
            Vector3::new(-156.9, 156.9, 9.81),
            Vector3::new(-34.9, 34.9, 0.01),
            -40.0,
        );
        let row = s.to_csv_row().unwrap();
        assert_eq!(row.trim_end().split(',').count(), 8);
        assert!(row.ends_with(LINE_ENDING));
    }

    #[test]
    fn test_header_line() {
        let line = header_line();
        assert!(line.starts_with("Timestamp,"));
        assert!(line.ends_with("Temp\r\n"));
        assert_eq!(CSV_HEADER.split(',').count(), 8);
    }
}
