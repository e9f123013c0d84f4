//! RP2040-specific HAL for the motion data logger firmware
//!
//! This crate provides RP2040 implementations of the shared `kinelog-hal`
//! traits:
//!
//! - GPIO adapters for the record trigger and status LED
//! - Session counter storage in flash (implements `kinelog_hal::FlashStorage`)

#![no_std]

pub mod flash;
pub mod gpio;

pub use flash::Rp2040FlashStorage;
pub use gpio::{StatusLed, TriggerInput};
