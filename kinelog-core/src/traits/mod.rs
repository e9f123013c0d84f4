//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and the peripheral drivers. Digital pins and flash storage come from
//! `kinelog-hal`; the traits here cover the devices the recorder talks to.

pub mod clock;
pub mod motion;
pub mod storage;

pub use clock::{ClockError, ClockSource};
pub use motion::{MotionEvent, MotionSensor, SensorError, Vector3};
pub use storage::LogVolume;
