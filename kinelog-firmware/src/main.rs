//! Kinelog - Motion Data Logger Firmware
//!
//! Main firmware binary for RP2040-based motion loggers. Each trigger
//! samples the MPU6050, stamps the reading from the DS1307 and appends it
//! to a per-session CSV file on the SD card.
//!
//! Wiring (Raspberry Pi Pico):
//! - RTC: I2C0, SDA GPIO4, SCL GPIO5
//! - MPU6050: I2C1, SDA GPIO6, SCL GPIO7
//! - SD card: SPI0, SCK GPIO18, MOSI GPIO19, MISO GPIO16, CS GPIO17
//! - Record trigger: GPIO26, active-low
//! - Status LED: GPIO25
//!
//! The DS1307 and MPU6050 both answer at 0x68, hence the two I2C buses.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::spi::{self, Spi};
use embassy_time::{Delay, Timer};
use embedded_hal_bus::spi::ExclusiveDevice;
use embedded_sdmmc::{SdCard, VolumeManager};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use kinelog_core::sequence::PersistentCounter;
use kinelog_core::trigger::SelectedTrigger;
use kinelog_core::{boot, Recorder};
use kinelog_drivers::{Ds1307, Mpu6050, SdLogVolume, SessionTimeSource};
use kinelog_hal::OutputPin;
use kinelog_hal_rp2040::{Rp2040FlashStorage, StatusLed, TriggerInput};

mod config;
mod report;
mod tasks;

// File timestamps, shared with the volume manager for the program lifetime
static TIME_SOURCE: StaticCell<SessionTimeSource> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Kinelog firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let build_time = config::build_time();
    let time_source: &'static SessionTimeSource =
        TIME_SOURCE.init(SessionTimeSource::new(&build_time));

    let mut led = StatusLed::new(p.PIN_25);
    let button = TriggerInput::new(p.PIN_26);

    // RTC and IMU on separate buses
    let rtc_bus = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config());
    let imu_bus = I2c::new_blocking(p.I2C1, p.PIN_7, p.PIN_6, i2c_config());
    let mut clock = Ds1307::new(rtc_bus);
    let mut sensor = Mpu6050::with_address(imu_bus, Delay, config::MPU_ADDRESS);
    info!("I2C buses initialized");

    // SD card over SPI0, initialized at 400 kHz
    let mut spi_config = spi::Config::default();
    spi_config.frequency = config::SD_INIT_FREQUENCY_HZ;
    let sd_spi = Spi::new_blocking(p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, spi_config);
    let sd_cs = Output::new(p.PIN_17, Level::High);
    let sd_device = match ExclusiveDevice::new(sd_spi, sd_cs, Delay) {
        Ok(device) => device,
        Err(e) => match e {},
    };

    let card = SdCard::new(sd_device, Delay);
    match card.num_bytes() {
        Ok(bytes) => {
            info!("SD card: {} MB", bytes / (1024 * 1024));
            card.spi(|device| device.bus_mut().set_frequency(config::SD_FREQUENCY_HZ));
        }
        // Mounting reports the failure
        Err(e) => warn!("SD card not responding: {}", Debug2Format(&e)),
    }
    let mut volume = SdLogVolume::new(VolumeManager::new(card, time_source));

    // Session counter in the last 64K of flash
    let flash = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let mut counter = PersistentCounter::new(flash, config::RECORDER.overflow);

    let booted = boot(
        &mut sensor,
        &mut clock,
        &mut volume,
        &mut counter,
        &config::MOTION,
        &build_time,
    )
    .await;

    let booted = match booted {
        Ok(report) => report,
        Err(e) => {
            report::boot_failure(&e);
            loop {
                fault_blink(&mut led).await;
            }
        }
    };
    report::boot_report(&booted);

    // New files carry the session start time
    time_source.set(&booted.started);

    let trigger = SelectedTrigger::new(
        config::RECORDER.trigger_mode,
        button,
        Delay,
        config::TRIGGER_TIMING,
    );
    info!(
        "Trigger: {}, throttle {} ms, UTC offset {} h",
        trigger.mode(),
        config::RECORDER.throttle_ms,
        config::RECORDER.utc_offset.hours()
    );

    let recorder = Recorder::new(
        trigger,
        led,
        clock,
        sensor,
        volume,
        booted.session,
        config::RECORDER.utc_offset,
    );

    match tasks::recorder_task(recorder) {
        Ok(token) => spawner.spawn(token),
        Err(e) => error!("Failed to spawn recorder task: {}", Debug2Format(&e)),
    }
}

/// I2C configuration shared by both buses
fn i2c_config() -> i2c::Config {
    let mut cfg = i2c::Config::default();
    cfg.frequency = config::I2C_FREQUENCY_HZ;
    cfg
}

/// Short flash once a second while halted
async fn fault_blink(led: &mut StatusLed<'static>) {
    led.set_high();
    Timer::after_millis(100).await;
    led.set_low();
    Timer::after_millis(900).await;
}
