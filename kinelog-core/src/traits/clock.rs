//! Real-time clock trait

use crate::clock::DateTime;

/// Errors that can occur reading or setting the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// Bus transaction failed (device absent or not acknowledging)
    Bus,
    /// Registers hold an impossible date or time
    InvalidTime,
    /// Requested time is outside what the device can store
    OutOfRange,
}

/// Trait for battery-backed real-time clocks
///
/// The clock keeps UTC. Offsets are applied when timestamps are formatted,
/// never stored in the device.
pub trait ClockSource {
    /// Check whether the oscillator is running
    ///
    /// A clock that has lost its backup supply reports `false` and holds a
    /// meaningless time until [`ClockSource::adjust`] is called.
    fn is_running(&mut self) -> Result<bool, ClockError>;

    /// Read the current date and time
    fn now(&mut self) -> Result<DateTime, ClockError>;

    /// Set the date and time and start the oscillator
    fn adjust(&mut self, time: &DateTime) -> Result<(), ClockError>;
}
