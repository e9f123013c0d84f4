//! Kinelog Hardware Abstraction Layer
//!
//! This crate defines the small set of hardware traits the recorder logic
//! needs from a board: the trigger input, the status indicator output, and a
//! persistent key/value store for state that must survive power loss.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (kinelog-firmware)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  kinelog-core (recorder, log store)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  kinelog-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ kinelog-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! Sensor, clock and card drivers talk to their buses through `embedded-hal`
//! directly and are not abstracted here.
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`flash::FlashStorage`] - Persistent storage

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod gpio;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use gpio::{InputPin, OutputPin};
