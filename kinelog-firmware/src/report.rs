//! Diagnostic output
//!
//! The core crates return typed outcomes; this is where they become log
//! lines on the RTT channel.

use defmt::*;

use kinelog_core::clock::{format_timestamp, DateTime};
use kinelog_core::config::UtcOffset;
use kinelog_core::recorder::DropReason;
use kinelog_core::sequence::LoadSource;
use kinelog_core::store::StoreError;
use kinelog_core::{BootError, BootReport, CycleReport, SessionIdentity};
use kinelog_drivers::SdError;

/// Log a clock reading as an ISO-8601 UTC timestamp
fn log_time(label: &str, time: &DateTime) {
    match format_timestamp(time, UtcOffset::UTC) {
        Some(stamp) => info!("{}: {}", label, stamp.as_str()),
        None => info!("{}: {}", label, time),
    }
}

/// Fatal boot failure
pub fn boot_failure(error: &BootError<SdError>) {
    match error {
        BootError::SensorNotFound(e) => error!("Failed to find MPU6050 chip: {}", e),
        BootError::ClockNotFound(e) => error!("Couldn't find RTC: {}", e),
        BootError::StorageUnavailable(e) => error!("SD card initialization failed: {}", e),
    }
    error!("Halted");
}

/// Successful boot
pub fn boot_report(report: &BootReport) {
    info!("MPU6050 found");
    info!("RTC found");
    if report.clock_seeded {
        warn!("RTC was not running, set to build time");
    }
    log_time("Clock", &report.started);
    info!("SD card initialized");

    let sequence = &report.sequence;
    match sequence.source {
        LoadSource::Stored => {}
        LoadSource::Missing => warn!("No session counter stored, starting from 0"),
        LoadSource::OutOfRange(raw) => warn!("Session counter {} out of range, reset to 0", raw),
        LoadSource::Unreadable => warn!("Session counter unreadable, reset to 0"),
    }
    if let Err(e) = sequence.persisted {
        warn!("Session counter {} not saved: {}", sequence.value, e);
    }

    info!(
        "Session {} (counter {} -> {})",
        report.session.filename().as_str(),
        sequence.previous,
        sequence.value
    );
}

/// One completed trigger cycle
pub fn cycle(session: &SessionIdentity, report: &CycleReport<SdError>) {
    let filename = session.filename();
    match report {
        CycleReport::Idle => {}
        CycleReport::Recorded { created } => {
            if *created {
                info!("Created {}", filename.as_str());
            }
            info!("Data recorded to {}", filename.as_str());
        }
        CycleReport::Dropped(DropReason::Store(StoreError::Create(e))) => {
            error!("Error creating {}: {}", filename.as_str(), e)
        }
        CycleReport::Dropped(DropReason::Store(e)) => {
            error!("Error opening file for writing: {}", e)
        }
        CycleReport::Dropped(DropReason::Sensor(e)) => warn!("Sample lost, sensor: {}", e),
        CycleReport::Dropped(DropReason::Clock(e)) => warn!("Sample lost, clock: {}", e),
        CycleReport::Dropped(DropReason::Format) => warn!("Sample lost, row did not fit"),
    }
}
