//! Recorder state machine
//!
//! Two observable states. The machine is explicit, finite and
//! deterministic; the recorder feeds it events and acts on the result.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::RecorderState;
