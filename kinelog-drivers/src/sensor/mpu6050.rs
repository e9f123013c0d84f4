//! MPU6050 accelerometer/gyroscope (I2C)
//!
//! Six-axis IMU with an on-die temperature sensor.
//!
//! # Bring-up
//!
//! 1. Check WHO_AM_I reads 0x68
//! 2. Device reset, 100 ms settle
//! 3. Sample rate divisor 0, low-pass filter, gyro and accel ranges
//! 4. Select the X-gyro PLL as clock source (also leaves sleep mode)
//!
//! # Data
//!
//! One 14-byte burst from ACCEL_XOUT_H: accel XYZ, temperature, gyro XYZ,
//! each a big-endian `i16`.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use kinelog_core::config::{AccelRange, FilterBandwidth, GyroRange, MotionConfig};
use kinelog_core::traits::{MotionEvent, MotionSensor, SensorError, Vector3};

/// Default I2C address (AD0 low)
pub const DEFAULT_ADDRESS: u8 = 0x68;

/// Expected WHO_AM_I value
pub const DEVICE_ID: u8 = 0x68;

/// Standard gravity in m/s²
const STANDARD_GRAVITY: f32 = 9.80665;

/// Degrees to radians
const DEG_TO_RAD: f32 = 0.017_453_293;

/// MPU6050 register addresses
pub mod reg {
    /// Sample rate divider
    pub const SMPLRT_DIV: u8 = 0x19;
    /// Digital low-pass filter configuration
    pub const CONFIG: u8 = 0x1A;
    /// Gyroscope full-scale range
    pub const GYRO_CONFIG: u8 = 0x1B;
    /// Accelerometer full-scale range
    pub const ACCEL_CONFIG: u8 = 0x1C;
    /// First data register (burst start)
    pub const ACCEL_XOUT_H: u8 = 0x3B;
    /// Power management 1
    pub const PWR_MGMT_1: u8 = 0x6B;
    /// Device identity
    pub const WHO_AM_I: u8 = 0x75;
}

/// PWR_MGMT_1 device reset bit
const DEVICE_RESET: u8 = 0x80;

/// PWR_MGMT_1 clock select: PLL with X axis gyro reference
const CLKSEL_PLL_XGYRO: u8 = 0x01;

/// Settle time after reset and after wake-up (ms)
const SETTLE_MS: u32 = 100;

/// Length of the accel/temp/gyro burst
const DATA_LEN: usize = 14;

/// Range register bits (FS_SEL / AFS_SEL live in bits 4:3)
fn accel_bits(range: AccelRange) -> u8 {
    let sel = match range {
        AccelRange::G2 => 0,
        AccelRange::G4 => 1,
        AccelRange::G8 => 2,
        AccelRange::G16 => 3,
    };
    sel << 3
}

fn gyro_bits(range: GyroRange) -> u8 {
    let sel = match range {
        GyroRange::Dps250 => 0,
        GyroRange::Dps500 => 1,
        GyroRange::Dps1000 => 2,
        GyroRange::Dps2000 => 3,
    };
    sel << 3
}

/// DLPF_CFG value for the CONFIG register
fn bandwidth_bits(bandwidth: FilterBandwidth) -> u8 {
    match bandwidth {
        FilterBandwidth::Hz260 => 0,
        FilterBandwidth::Hz184 => 1,
        FilterBandwidth::Hz94 => 2,
        FilterBandwidth::Hz44 => 3,
        FilterBandwidth::Hz21 => 4,
        FilterBandwidth::Hz10 => 5,
        FilterBandwidth::Hz5 => 6,
    }
}

/// Accelerometer sensitivity (LSB per g)
fn accel_lsb_per_g(range: AccelRange) -> f32 {
    match range {
        AccelRange::G2 => 16384.0,
        AccelRange::G4 => 8192.0,
        AccelRange::G8 => 4096.0,
        AccelRange::G16 => 2048.0,
    }
}

/// Gyroscope sensitivity (LSB per °/s)
fn gyro_lsb_per_dps(range: GyroRange) -> f32 {
    match range {
        GyroRange::Dps250 => 131.0,
        GyroRange::Dps500 => 65.5,
        GyroRange::Dps1000 => 32.8,
        GyroRange::Dps2000 => 16.4,
    }
}

/// Die temperature from the raw register value
fn temperature_c(raw: i16) -> f32 {
    raw as f32 / 340.0 + 36.53
}

/// MPU6050 driver
pub struct Mpu6050<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    config: MotionConfig,
}

impl<I2C: I2c, D: DelayNs> Mpu6050<I2C, D> {
    /// Create a driver at the default address
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, DEFAULT_ADDRESS)
    }

    /// Create a driver at a specific address (0x69 with AD0 high)
    pub fn with_address(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            config: MotionConfig::default(),
        }
    }

    /// Configuration currently applied
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Release the bus and delay
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|_| SensorError::Bus)
    }

    fn read_regs(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), SensorError> {
        self.i2c
            .write_read(self.address, &[reg], buf)
            .map_err(|_| SensorError::Bus)
    }

    fn probe(&mut self) -> Result<(), SensorError> {
        let mut id = [0u8; 1];
        self.read_regs(reg::WHO_AM_I, &mut id)
            .map_err(|_| SensorError::NotFound)?;
        if id[0] != DEVICE_ID {
            return Err(SensorError::NotFound);
        }
        Ok(())
    }
}

impl<I2C: I2c, D: DelayNs> MotionSensor for Mpu6050<I2C, D> {
    fn configure(&mut self, config: &MotionConfig) -> Result<(), SensorError> {
        self.probe()?;

        self.write_reg(reg::PWR_MGMT_1, DEVICE_RESET)?;
        self.delay.delay_ms(SETTLE_MS);

        self.write_reg(reg::SMPLRT_DIV, 0)?;
        self.write_reg(reg::CONFIG, bandwidth_bits(config.bandwidth))?;
        self.write_reg(reg::GYRO_CONFIG, gyro_bits(config.gyro_range))?;
        self.write_reg(reg::ACCEL_CONFIG, accel_bits(config.accel_range))?;

        self.write_reg(reg::PWR_MGMT_1, CLKSEL_PLL_XGYRO)?;
        self.delay.delay_ms(SETTLE_MS);

        self.config = *config;
        Ok(())
    }

    fn read_event(&mut self) -> Result<MotionEvent, SensorError> {
        let mut buf = [0u8; DATA_LEN];
        self.read_regs(reg::ACCEL_XOUT_H, &mut buf)?;

        let word = |i: usize| i16::from_be_bytes([buf[i], buf[i + 1]]);

        let accel_scale = STANDARD_GRAVITY / accel_lsb_per_g(self.config.accel_range);
        let gyro_scale = DEG_TO_RAD / gyro_lsb_per_dps(self.config.gyro_range);

        Ok(MotionEvent {
            acceleration: Vector3::new(
                word(0) as f32 * accel_scale,
                word(2) as f32 * accel_scale,
                word(4) as f32 * accel_scale,
            ),
            temperature_c: temperature_c(word(6)),
            gyro: Vector3::new(
                word(8) as f32 * gyro_scale,
                word(10) as f32 * gyro_scale,
                word(12) as f32 * gyro_scale,
            ),
        })
    }
}
