//! Events that trigger state transitions

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Trigger policy reported a trigger
    TriggerAsserted,
    /// Sample cycle finished (written or dropped) and the throttle elapsed
    CycleComplete,
}
