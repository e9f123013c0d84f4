//! Boot sequence
//!
//! Brings up every peripheral in a fixed order and derives the session
//! identity. Missing hardware is returned as a [`BootError`]; deciding what
//! to do about it (halt, blink, retry) is left to the firmware.
//!
//! Order:
//! 1. motion sensor probe and configuration
//! 2. clock probe, seeding a halted clock with the build time
//! 3. log volume mount
//! 4. session date from the clock
//! 5. sequence counter load, advance and write-back
//!
//! The counter is only advanced once all hardware is known good, so a
//! failed boot does not consume a sequence number.

use kinelog_hal::FlashStorage;

use crate::clock::DateTime;
use crate::config::MotionConfig;
use crate::sequence::{Advance, PersistentCounter};
use crate::session::SessionIdentity;
use crate::traits::{ClockError, ClockSource, LogVolume, MotionSensor, SensorError};

/// Fatal boot failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootError<E> {
    /// Motion sensor absent or not configurable
    SensorNotFound(SensorError),
    /// Clock absent or not answering
    ClockNotFound(ClockError),
    /// Storage medium absent or not mountable
    StorageUnavailable(E),
}

/// What happened during a successful boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootReport {
    /// Identity of the session that is starting
    pub session: SessionIdentity,
    /// Clock reading the session date was taken from (UTC)
    pub started: DateTime,
    /// The clock was halted and has been set to the build time
    pub clock_seeded: bool,
    /// Sequence counter outcome
    pub sequence: Advance,
}

/// Run the boot sequence
pub async fn boot<S, C, V, F>(
    sensor: &mut S,
    clock: &mut C,
    volume: &mut V,
    counter: &mut PersistentCounter<F>,
    motion: &MotionConfig,
    build_time: &DateTime,
) -> Result<BootReport, BootError<V::Error>>
where
    S: MotionSensor,
    C: ClockSource,
    V: LogVolume,
    F: FlashStorage,
{
    sensor
        .configure(motion)
        .map_err(BootError::SensorNotFound)?;

    let running = clock.is_running().map_err(BootError::ClockNotFound)?;
    if !running {
        clock
            .adjust(build_time)
            .map_err(BootError::ClockNotFound)?;
    }

    volume.mount().map_err(BootError::StorageUnavailable)?;

    let now = clock.now().map_err(BootError::ClockNotFound)?;

    let sequence = counter.advance().await;
    let session = SessionIdentity::new(now.date(), sequence.value);

    Ok(BootReport {
        session,
        started: now,
        clock_seeded: !running,
        sequence,
    })
}
