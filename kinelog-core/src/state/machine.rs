//! State machine definition

use super::events::Event;

/// Recorder states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecorderState {
    /// Polling the trigger, indicator off
    #[default]
    Idle,
    /// Sample cycle in progress, indicator on
    Recording,
}

impl RecorderState {
    /// Check if the status indicator should be lit
    pub fn indicator_on(&self) -> bool {
        matches!(self, RecorderState::Recording)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use RecorderState::*;

        match (self, event) {
            (Idle, TriggerAsserted) => Recording,
            (Recording, CycleComplete) => Idle,

            // A cycle cannot restart itself; idle cannot complete
            _ => self,
        }
    }
}
