//! Motion sensor trait

use crate::config::MotionConfig;

/// Errors that can occur with the motion sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Device did not answer with the expected identity
    NotFound,
    /// Bus transaction failed
    Bus,
}

/// Three-axis reading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One snapshot of all sensor channels
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionEvent {
    /// Linear acceleration in m/s²
    pub acceleration: Vector3,
    /// Angular velocity in rad/s
    pub gyro: Vector3,
    /// Die temperature in °C
    pub temperature_c: f32,
}

/// Trait for accelerometer/gyroscope combos
pub trait MotionSensor {
    /// Probe the device and apply the measurement configuration
    ///
    /// Called once at boot. Returns [`SensorError::NotFound`] if the device
    /// is absent or reports the wrong identity.
    fn configure(&mut self, config: &MotionConfig) -> Result<(), SensorError>;

    /// Read one snapshot of all channels
    fn read_event(&mut self) -> Result<MotionEvent, SensorError>;
}
