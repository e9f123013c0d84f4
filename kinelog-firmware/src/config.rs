//! Build-time logger configuration
//!
//! The constants below are generated by build.rs from logger.toml, which
//! has already been range-checked by the time this compiles.

use kinelog_core::clock::DateTime;
use kinelog_core::config::{MotionConfig, RecorderConfig, UtcOffset};
use kinelog_core::trigger::TriggerTiming;

mod generated {
    include!(concat!(env!("OUT_DIR"), "/logger_config.rs"));
}

pub use generated::*;

/// SPI clock while the SD card is initialized
pub const SD_INIT_FREQUENCY_HZ: u32 = 400_000;

pub const UTC_OFFSET: UtcOffset = match UtcOffset::from_hours(UTC_OFFSET_HOURS) {
    Some(offset) => offset,
    None => panic!("utc_offset_hours out of range"),
};

pub const RECORDER: RecorderConfig = RecorderConfig {
    utc_offset: UTC_OFFSET,
    throttle_ms: THROTTLE_MS,
    idle_poll_ms: IDLE_POLL_MS,
    trigger_mode: TRIGGER_MODE,
    overflow: SEQUENCE_OVERFLOW,
};

pub const MOTION: MotionConfig = MotionConfig {
    accel_range: ACCEL_RANGE,
    gyro_range: GYRO_RANGE,
    bandwidth: BANDWIDTH,
};

pub const TRIGGER_TIMING: TriggerTiming =
    TriggerTiming::new(RECORDER.throttle_ms, RECORDER.idle_poll_ms);

/// Firmware build time (UTC), written to a halted clock
pub fn build_time() -> DateTime {
    DateTime::from_unix_seconds(BUILD_UNIX_TIME).unwrap_or(DateTime::UNIX_EPOCH)
}
