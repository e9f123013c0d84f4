//! Edge-detecting trigger

use embedded_hal_async::delay::DelayNs;
use kinelog_hal::InputPin;

use super::{pause, TriggerPolicy, TriggerTiming};

/// Fires once per press of the active-low input
///
/// The input must be seen released before it can fire again, so holding
/// it produces a single sample.
pub struct EdgeTrigger<P, D> {
    input: P,
    delay: D,
    timing: TriggerTiming,
    was_asserted: bool,
}

impl<P: InputPin, D: DelayNs> EdgeTrigger<P, D> {
    /// Create the trigger
    ///
    /// An input already held at construction does not fire until it has
    /// been released once.
    pub fn new(input: P, delay: D, timing: TriggerTiming) -> Self {
        let was_asserted = input.is_low();
        Self {
            input,
            delay,
            timing,
            was_asserted,
        }
    }
}

impl<P: InputPin, D: DelayNs> TriggerPolicy for EdgeTrigger<P, D> {
    fn poll(&mut self) -> bool {
        let asserted = self.input.is_low();
        let fired = asserted && !self.was_asserted;
        self.was_asserted = asserted;
        fired
    }

    async fn throttle(&mut self) {
        pause(&mut self.delay, self.timing.throttle_ms).await;
    }

    async fn idle(&mut self) {
        pause(&mut self.delay, self.timing.idle_poll_ms).await;
    }
}
