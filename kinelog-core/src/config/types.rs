//! Recorder configuration type definitions
//!
//! These types describe how the recorder behaves: how often it may sample,
//! how the trigger is interpreted, which UTC offset is printed in
//! timestamps and what the session counter does when it runs out of range.

/// Default UTC offset in hours applied to log timestamps
pub const DEFAULT_UTC_OFFSET_HOURS: i8 = 7;

/// Default minimum interval between two samples (ms)
pub const DEFAULT_THROTTLE_MS: u32 = 150;

/// Default trigger re-check period while idle (ms)
pub const DEFAULT_IDLE_POLL_MS: u32 = 1;

/// Fixed offset from UTC, in whole hours
///
/// Compile-time fixed; never read from the clock or any external source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UtcOffset {
    hours: i8,
}

impl UtcOffset {
    /// Zero offset, printed as `Z`
    pub const UTC: Self = Self { hours: 0 };

    /// Smallest offset in use anywhere (UTC-12)
    pub const MIN_HOURS: i8 = -12;

    /// Largest offset in use anywhere (UTC+14)
    pub const MAX_HOURS: i8 = 14;

    /// Create an offset, rejecting values outside UTC-12..=UTC+14
    pub const fn from_hours(hours: i8) -> Option<Self> {
        if hours < Self::MIN_HOURS || hours > Self::MAX_HOURS {
            None
        } else {
            Some(Self { hours })
        }
    }

    /// Offset in hours
    pub const fn hours(&self) -> i8 {
        self.hours
    }

    /// Offset in seconds
    pub const fn seconds(&self) -> i64 {
        self.hours as i64 * 3600
    }

    /// Check if this is UTC itself
    pub const fn is_utc(&self) -> bool {
        self.hours == 0
    }
}

impl Default for UtcOffset {
    fn default() -> Self {
        Self {
            hours: DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

/// What the session counter does when advanced past its maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OverflowPolicy {
    /// 255 advances to 1; 0 stays reserved for "never booted"
    #[default]
    Wrap,
    /// 255 stays 255; later sessions that day share one file
    Saturate,
}

/// How the trigger input starts a sample cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerMode {
    /// Sample while the input is held, once per throttle interval
    #[default]
    Level,
    /// Sample once per press
    Edge,
}

/// Recorder behaviour configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RecorderConfig {
    /// Offset applied to timestamps written to the log
    pub utc_offset: UtcOffset,
    /// Fixed pause after each sample cycle (ms)
    pub throttle_ms: u32,
    /// Pause between trigger checks while idle (ms, 0 = just yield)
    pub idle_poll_ms: u32,
    /// Trigger interpretation
    pub trigger_mode: TriggerMode,
    /// Session counter overflow behaviour
    pub overflow: OverflowPolicy,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            utc_offset: UtcOffset::default(),
            throttle_ms: DEFAULT_THROTTLE_MS,
            idle_poll_ms: DEFAULT_IDLE_POLL_MS,
            trigger_mode: TriggerMode::Level,
            overflow: OverflowPolicy::Wrap,
        }
    }
}
