//! Board-agnostic core logic for the motion data logger firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Peripheral capability traits (clock, motion sensor, log volume)
//! - Calendar arithmetic and ISO-8601 timestamps
//! - Persistent session sequence counter
//! - Session identity and log file naming
//! - CSV sample formatting and the append-only log store
//! - Trigger policies and the recorder state machine
//! - Boot sequence with explicit fatal errors
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod boot;
pub mod clock;
pub mod config;
pub mod recorder;
pub mod sample;
pub mod sequence;
pub mod session;
pub mod state;
pub mod store;
pub mod traits;
pub mod trigger;

pub use boot::{boot, BootError, BootReport};
pub use recorder::{CycleReport, DropReason, Recorder};
pub use session::SessionIdentity;
