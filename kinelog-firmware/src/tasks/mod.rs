//! Embassy async tasks
//!
//! The logger runs a single task; everything else happens at boot.

pub mod recorder;

pub use recorder::{recorder_task, LoggerRecorder};
