//! Build script for kinelog-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates logger.toml at compile time
//! - Generates the logger configuration constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    setup_linker();
    let config = validate_config();
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validated logger.toml values
struct LoggerConfig {
    utc_offset_hours: i64,
    throttle_ms: i64,
    idle_poll_ms: i64,
    trigger_mode: &'static str,
    sequence_overflow: &'static str,
    accel_range: &'static str,
    gyro_range: &'static str,
    bandwidth: &'static str,
    address: i64,
    i2c_frequency_hz: i64,
    sd_frequency_hz: i64,
}

/// Validate logger.toml configuration at compile time
fn validate_config() -> LoggerConfig {
    // Re-run if logger.toml changes
    println!("cargo:rerun-if-changed=logger.toml");

    let config_path = Path::new("logger.toml");

    // Check if config file exists
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: logger.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a logger.toml configuration file.         ║\n\
            ║  Please create one in the kinelog-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    // Read the config file
    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read logger.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in logger.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    // Validate required sections exist
    validate_required_sections(&config);

    let mut errors = Vec::new();
    let recorder = Section::new(&config, "recorder");
    let motion = Section::new(&config, "motion");
    let bus = Section::new(&config, "bus");

    let validated = LoggerConfig {
        utc_offset_hours: recorder.integer("utc_offset_hours", -12..=14, &mut errors),
        throttle_ms: recorder.integer("throttle_ms", 0..=60_000, &mut errors),
        idle_poll_ms: recorder.integer("idle_poll_ms", 0..=1_000, &mut errors),
        trigger_mode: recorder.choice(
            "trigger_mode",
            &[("level", "Level"), ("edge", "Edge")],
            &mut errors,
        ),
        sequence_overflow: recorder.choice(
            "sequence_overflow",
            &[("wrap", "Wrap"), ("saturate", "Saturate")],
            &mut errors,
        ),
        accel_range: motion.integer_choice(
            "accel_range_g",
            &[(2, "G2"), (4, "G4"), (8, "G8"), (16, "G16")],
            &mut errors,
        ),
        gyro_range: motion.integer_choice(
            "gyro_range_dps",
            &[
                (250, "Dps250"),
                (500, "Dps500"),
                (1000, "Dps1000"),
                (2000, "Dps2000"),
            ],
            &mut errors,
        ),
        bandwidth: motion.integer_choice(
            "bandwidth_hz",
            &[
                (260, "Hz260"),
                (184, "Hz184"),
                (94, "Hz94"),
                (44, "Hz44"),
                (21, "Hz21"),
                (10, "Hz10"),
                (5, "Hz5"),
            ],
            &mut errors,
        ),
        address: motion.integer("address", 0x68..=0x69, &mut errors),
        i2c_frequency_hz: bus.integer("i2c_frequency_hz", 10_000..=1_000_000, &mut errors),
        sd_frequency_hz: bus.integer("sd_frequency_hz", 400_000..=25_000_000, &mut errors),
    };

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid logger configuration                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=logger.toml validated successfully");
    validated
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            // Width and padding count chars, values may hold any UTF-8
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validate that required sections exist
fn validate_required_sections(config: &toml::Value) {
    let errors: Vec<String> = ["recorder", "motion", "bus"]
        .iter()
        .filter(|name| !matches!(config.get(**name), Some(toml::Value::Table(_))))
        .map(|name| format!("Missing [{}] section", name))
        .collect();

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Missing required sections in logger.toml                 ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

/// One `[section]` of logger.toml
struct Section<'a> {
    name: &'static str,
    table: &'a toml::Value,
}

impl<'a> Section<'a> {
    fn new(config: &'a toml::Value, name: &'static str) -> Self {
        // Presence checked by validate_required_sections
        Self {
            name,
            table: &config[name],
        }
    }

    /// Integer key within `range`; errors are collected, 0 is returned
    fn integer(
        &self,
        key: &str,
        range: std::ops::RangeInclusive<i64>,
        errors: &mut Vec<String>,
    ) -> i64 {
        match self.table.get(key) {
            Some(toml::Value::Integer(v)) if range.contains(v) => *v,
            Some(toml::Value::Integer(_)) => {
                errors.push(format!(
                    "[{}] {} must be {}-{}",
                    self.name,
                    key,
                    range.start(),
                    range.end()
                ));
                0
            }
            Some(_) => {
                errors.push(format!("[{}] {} must be an integer", self.name, key));
                0
            }
            None => {
                errors.push(format!("[{}] missing '{}'", self.name, key));
                0
            }
        }
    }

    /// String key mapped to a variant name
    fn choice(
        &self,
        key: &str,
        options: &[(&str, &'static str)],
        errors: &mut Vec<String>,
    ) -> &'static str {
        let value = match self.table.get(key) {
            Some(toml::Value::String(s)) => s.as_str(),
            Some(_) => {
                errors.push(format!("[{}] {} must be a string", self.name, key));
                return options[0].1;
            }
            None => {
                errors.push(format!("[{}] missing '{}'", self.name, key));
                return options[0].1;
            }
        };

        match options.iter().find(|(name, _)| *name == value) {
            Some((_, variant)) => *variant,
            None => {
                let names: Vec<String> = options.iter().map(|(n, _)| format!("'{}'", n)).collect();
                errors.push(format!(
                    "[{}] {} must be {}",
                    self.name,
                    key,
                    names.join(" or ")
                ));
                options[0].1
            }
        }
    }

    /// Integer key mapped to a variant name
    fn integer_choice(
        &self,
        key: &str,
        options: &[(i64, &'static str)],
        errors: &mut Vec<String>,
    ) -> &'static str {
        let value = match self.table.get(key) {
            Some(toml::Value::Integer(v)) => *v,
            Some(_) => {
                errors.push(format!("[{}] {} must be an integer", self.name, key));
                return options[0].1;
            }
            None => {
                errors.push(format!("[{}] missing '{}'", self.name, key));
                return options[0].1;
            }
        };

        match options.iter().find(|(v, _)| *v == value) {
            Some((_, variant)) => *variant,
            None => {
                let values: Vec<String> = options.iter().map(|(v, _)| v.to_string()).collect();
                errors.push(format!(
                    "[{}] {} must be one of {}",
                    self.name,
                    key,
                    values.join(", ")
                ));
                options[0].1
            }
        }
    }
}

/// Seconds since the Unix epoch, honouring SOURCE_DATE_EPOCH
fn build_unix_time() -> i64 {
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    if let Ok(epoch) = env::var("SOURCE_DATE_EPOCH") {
        match epoch.trim().parse::<i64>() {
            Ok(secs) => return secs,
            Err(_) => println!("cargo:warning=SOURCE_DATE_EPOCH is not an integer, using now"),
        }
    }

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Write logger_config.rs into OUT_DIR
fn generate_config(config: &LoggerConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let source = format!(
        "// Generated by build.rs from logger.toml\n\
         \n\
         pub const UTC_OFFSET_HOURS: i8 = {utc_offset_hours};\n\
         pub const THROTTLE_MS: u32 = {throttle_ms};\n\
         pub const IDLE_POLL_MS: u32 = {idle_poll_ms};\n\
         pub const TRIGGER_MODE: kinelog_core::config::TriggerMode = kinelog_core::config::TriggerMode::{trigger_mode};\n\
         pub const SEQUENCE_OVERFLOW: kinelog_core::config::OverflowPolicy = kinelog_core::config::OverflowPolicy::{sequence_overflow};\n\
         pub const ACCEL_RANGE: kinelog_core::config::AccelRange = kinelog_core::config::AccelRange::{accel_range};\n\
         pub const GYRO_RANGE: kinelog_core::config::GyroRange = kinelog_core::config::GyroRange::{gyro_range};\n\
         pub const BANDWIDTH: kinelog_core::config::FilterBandwidth = kinelog_core::config::FilterBandwidth::{bandwidth};\n\
         pub const MPU_ADDRESS: u8 = {address:#04x};\n\
         pub const I2C_FREQUENCY_HZ: u32 = {i2c_frequency_hz};\n\
         pub const SD_FREQUENCY_HZ: u32 = {sd_frequency_hz};\n\
         pub const BUILD_UNIX_TIME: i64 = {build_time};\n",
        utc_offset_hours = config.utc_offset_hours,
        throttle_ms = config.throttle_ms,
        idle_poll_ms = config.idle_poll_ms,
        trigger_mode = config.trigger_mode,
        sequence_overflow = config.sequence_overflow,
        accel_range = config.accel_range,
        gyro_range = config.gyro_range,
        bandwidth = config.bandwidth,
        address = config.address,
        i2c_frequency_hz = config.i2c_frequency_hz,
        sd_frequency_hz = config.sd_frequency_hz,
        build_time = build_unix_time(),
    );

    fs::write(out_dir.join("logger_config.rs"), source).unwrap();
}
