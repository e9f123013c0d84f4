//! Trigger policies
//!
//! A policy decides when the recorder starts a sample cycle and how long it
//! waits afterwards. The recorder polls; policies never block in `poll`.

pub mod edge;
pub mod level;

use core::future::Future;

use embedded_hal_async::delay::DelayNs;
use kinelog_hal::InputPin;

use crate::config::TriggerMode;

pub use edge::EdgeTrigger;
pub use level::LevelTrigger;

/// Decides when a sample cycle starts
pub trait TriggerPolicy {
    /// Sample the input and report whether a cycle should start now
    fn poll(&mut self) -> bool;

    /// Wait out the fixed interval after a completed cycle
    fn throttle(&mut self) -> impl Future<Output = ()>;

    /// Wait before the next poll while nothing is triggered
    fn idle(&mut self) -> impl Future<Output = ()>;
}

/// Shared timing for both policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriggerTiming {
    /// Pause after each cycle (ms)
    pub throttle_ms: u32,
    /// Pause between idle polls (ms, 0 = yield to the executor)
    pub idle_poll_ms: u32,
}

impl TriggerTiming {
    pub const fn new(throttle_ms: u32, idle_poll_ms: u32) -> Self {
        Self {
            throttle_ms,
            idle_poll_ms,
        }
    }
}

/// Trigger policy chosen by [`TriggerMode`]
///
/// Lets firmware pick the policy from configuration while keeping a single
/// concrete recorder type.
pub enum SelectedTrigger<P, D> {
    Level(LevelTrigger<P, D>),
    Edge(EdgeTrigger<P, D>),
}

impl<P: InputPin, D: DelayNs> SelectedTrigger<P, D> {
    pub fn new(mode: TriggerMode, input: P, delay: D, timing: TriggerTiming) -> Self {
        match mode {
            TriggerMode::Level => SelectedTrigger::Level(LevelTrigger::new(input, delay, timing)),
            TriggerMode::Edge => SelectedTrigger::Edge(EdgeTrigger::new(input, delay, timing)),
        }
    }

    pub fn mode(&self) -> TriggerMode {
        match self {
            SelectedTrigger::Level(_) => TriggerMode::Level,
            SelectedTrigger::Edge(_) => TriggerMode::Edge,
        }
    }
}

impl<P: InputPin, D: DelayNs> TriggerPolicy for SelectedTrigger<P, D> {
    fn poll(&mut self) -> bool {
        match self {
            SelectedTrigger::Level(t) => t.poll(),
            SelectedTrigger::Edge(t) => t.poll(),
        }
    }

    async fn throttle(&mut self) {
        match self {
            SelectedTrigger::Level(t) => t.throttle().await,
            SelectedTrigger::Edge(t) => t.throttle().await,
        }
    }

    async fn idle(&mut self) {
        match self {
            SelectedTrigger::Level(t) => t.idle().await,
            SelectedTrigger::Edge(t) => t.idle().await,
        }
    }
}

pub(crate) async fn pause<D: DelayNs>(delay: &mut D, ms: u32) {
    if ms == 0 {
        embassy_futures::yield_now().await;
    } else {
        delay.delay_ms(ms).await;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Virtual time for trigger and recorder tests

    use embedded_hal_async::delay::DelayNs;
    use kinelog_hal::InputPin;
    use std::cell::Cell;
    use std::rc::Rc;

    use super::TriggerPolicy;

    /// Monotonic virtual clock in nanoseconds
    #[derive(Clone, Default)]
    pub struct VirtualTime(Rc<Cell<u64>>);

    impl VirtualTime {
        pub fn now_ms(&self) -> u64 {
            self.0.get() / 1_000_000
        }

        pub fn delay(&self) -> VirtualDelay {
            VirtualDelay(self.clone())
        }
    }

    /// Delay that advances virtual time instead of sleeping
    pub struct VirtualDelay(VirtualTime);

    impl DelayNs for VirtualDelay {
        async fn delay_ns(&mut self, ns: u32) {
            let time = &self.0 .0;
            time.set(time.get() + u64::from(ns));
        }
    }

    /// Active-low button pressed during `[press_ms, release_ms)`
    pub struct ScriptedButton {
        time: VirtualTime,
        presses: Vec<(u64, u64)>,
    }

    impl ScriptedButton {
        pub fn new(time: &VirtualTime, presses: &[(u64, u64)]) -> Self {
            Self {
                time: time.clone(),
                presses: presses.to_vec(),
            }
        }
    }

    impl InputPin for ScriptedButton {
        fn is_high(&self) -> bool {
            let now = self.time.now_ms();
            !self
                .presses
                .iter()
                .any(|&(press, release)| now >= press && now < release)
        }
    }

    /// Count cycles a policy starts before virtual time reaches `until_ms`
    pub fn count_cycles<T: TriggerPolicy>(trigger: &mut T, time: &VirtualTime, until_ms: u64) -> u32 {
        let mut cycles = 0;
        while time.now_ms() < until_ms {
            if trigger.poll() {
                cycles += 1;
                embassy_futures::block_on(trigger.throttle());
            } else {
                embassy_futures::block_on(trigger.idle());
            }
        }
        cycles
    }
}
