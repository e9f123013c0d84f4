//! Device driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in kinelog-core for the logger's peripherals:
//!
//! - Motion sensor (MPU6050 over I2C)
//! - Real-time clock (DS1307 over I2C)
//! - Log volume (SD card FAT filesystem via embedded-sdmmc)
//!
//! Bus drivers are written against blocking `embedded-hal` 1.0 traits so
//! they run unchanged on the RP2040 and against mock buses on the host.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod rtc;
pub mod sensor;
pub mod storage;

pub use rtc::Ds1307;
pub use sensor::Mpu6050;
pub use storage::{SdError, SdLogVolume, SessionTimeSource};

#[cfg(test)]
pub(crate) mod testing;
