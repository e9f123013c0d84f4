//! Configuration types
//!
//! Board-agnostic configuration structures. Values are fixed at build time
//! by the firmware's `logger.toml`; the defaults here match the stock
//! recorder wiring.

pub mod hardware;
pub mod types;

pub use hardware::*;
pub use types::*;
