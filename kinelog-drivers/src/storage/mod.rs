//! Log volume backends

pub mod sdmmc;

pub use sdmmc::{SdError, SdLogVolume, SessionTimeSource};
