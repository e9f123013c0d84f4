//! Level-sampled trigger

use embedded_hal_async::delay::DelayNs;
use kinelog_hal::InputPin;

use super::{pause, TriggerPolicy, TriggerTiming};

/// Fires on every poll while the active-low input is held
///
/// A held input therefore samples once per throttle interval. There is no
/// edge detection and no debouncing.
pub struct LevelTrigger<P, D> {
    input: P,
    delay: D,
    timing: TriggerTiming,
}

impl<P: InputPin, D: DelayNs> LevelTrigger<P, D> {
    pub fn new(input: P, delay: D, timing: TriggerTiming) -> Self {
        Self {
            input,
            delay,
            timing,
        }
    }
}

impl<P: InputPin, D: DelayNs> TriggerPolicy for LevelTrigger<P, D> {
    fn poll(&mut self) -> bool {
        self.input.is_low()
    }

    async fn throttle(&mut self) {
        pause(&mut self.delay, self.timing.throttle_ms).await;
    }

    async fn idle(&mut self) {
        pause(&mut self.delay, self.timing.idle_poll_ms).await;
    }
}
