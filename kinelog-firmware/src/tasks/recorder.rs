//! Recorder task
//!
//! Embassy tasks cannot be generic, so the concrete peripheral types are
//! spelled out here.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::i2c::{Blocking as I2cBlocking, I2c};
use embassy_rp::peripherals::{I2C0, I2C1, SPI0};
use embassy_rp::spi::{Blocking as SpiBlocking, Spi};
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use embedded_sdmmc::SdCard;

use kinelog_core::trigger::SelectedTrigger;
use kinelog_core::Recorder;
use kinelog_drivers::{Ds1307, Mpu6050, SdLogVolume, SessionTimeSource};
use kinelog_hal_rp2040::{StatusLed, TriggerInput};

use crate::report;

/// DS1307 on I2C0
pub type Clock = Ds1307<I2c<'static, I2C0, I2cBlocking>>;

/// MPU6050 on I2C1
pub type Sensor = Mpu6050<I2c<'static, I2C1, I2cBlocking>, Delay>;

/// SD card on SPI0 with a dedicated chip select
pub type SdDevice = ExclusiveDevice<Spi<'static, SPI0, SpiBlocking>, Output<'static>, Delay>;

/// FAT volume on the SD card
pub type Volume = SdLogVolume<SdCard<SdDevice, Delay>, &'static SessionTimeSource>;

/// Record button policy
pub type Trigger = SelectedTrigger<TriggerInput<'static>, Delay>;

pub type LoggerRecorder = Recorder<Trigger, StatusLed<'static>, Clock, Sensor, Volume>;

/// Run the recorder loop until power is removed
#[embassy_executor::task]
pub async fn recorder_task(mut recorder: LoggerRecorder) {
    info!(
        "Recording to {}, waiting for trigger",
        recorder.session().filename().as_str()
    );
    recorder.run(report::cycle).await;
}
