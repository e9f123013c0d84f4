//! Hardware configuration types
//!
//! Measurement ranges and filtering for the motion sensor. The sensor is
//! configured once at boot and never reconfigured.

/// Accelerometer full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelRange {
    /// ±2 g
    G2,
    /// ±4 g
    G4,
    /// ±8 g
    G8,
    /// ±16 g
    #[default]
    G16,
}

impl AccelRange {
    /// Full-scale value in g
    pub const fn full_scale_g(self) -> u8 {
        match self {
            AccelRange::G2 => 2,
            AccelRange::G4 => 4,
            AccelRange::G8 => 8,
            AccelRange::G16 => 16,
        }
    }
}

/// Gyroscope full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroRange {
    /// ±250 °/s
    Dps250,
    /// ±500 °/s
    Dps500,
    /// ±1000 °/s
    Dps1000,
    /// ±2000 °/s
    #[default]
    Dps2000,
}

impl GyroRange {
    /// Full-scale value in degrees per second
    pub const fn full_scale_dps(self) -> u16 {
        match self {
            GyroRange::Dps250 => 250,
            GyroRange::Dps500 => 500,
            GyroRange::Dps1000 => 1000,
            GyroRange::Dps2000 => 2000,
        }
    }
}

/// Digital low-pass filter bandwidth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterBandwidth {
    Hz260,
    Hz184,
    #[default]
    Hz94,
    Hz44,
    Hz21,
    Hz10,
    Hz5,
}

impl FilterBandwidth {
    /// Nominal accelerometer bandwidth in Hz
    pub const fn hz(self) -> u16 {
        match self {
            FilterBandwidth::Hz260 => 260,
            FilterBandwidth::Hz184 => 184,
            FilterBandwidth::Hz94 => 94,
            FilterBandwidth::Hz44 => 44,
            FilterBandwidth::Hz21 => 21,
            FilterBandwidth::Hz10 => 10,
            FilterBandwidth::Hz5 => 5,
        }
    }
}

/// Motion sensor measurement configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionConfig {
    /// Accelerometer range (default ±16 g)
    pub accel_range: AccelRange,
    /// Gyroscope range (default ±2000 °/s)
    pub gyro_range: GyroRange,
    /// Low-pass filter bandwidth (default 94 Hz)
    pub bandwidth: FilterBandwidth,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_wide_range() {
        let config = MotionConfig::default();
        assert_eq!(config.accel_range.full_scale_g(), 16);
        assert_eq!(config.gyro_range.full_scale_dps(), 2000);
        assert_eq!(config.bandwidth.hz(), 94);
    }
}
