//! Calendar time and log timestamps
//!
//! The real-time clock keeps UTC. Everything shown to a human (the CSV
//! timestamp column) is shifted by the configured fixed offset.

pub mod datetime;
pub mod timestamp;

pub use datetime::{Date, DateTime};
pub use timestamp::{format_timestamp, Timestamp, TIMESTAMP_LEN};
