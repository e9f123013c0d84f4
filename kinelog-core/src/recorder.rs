//! Recorder control loop
//!
//! Owns every peripheral the loop touches. One [`Recorder::step`] polls the
//! trigger once and, if triggered, runs a full sample cycle:
//!
//! 1. indicator on
//! 2. read the motion sensor
//! 3. read the clock and format an offset-adjusted timestamp
//! 4. format the CSV row and append it to the session file
//! 5. back to idle, indicator off
//! 6. wait the throttle interval
//!
//! Any failure in steps 2-4 drops the sample and is returned in the
//! [`CycleReport`]; the loop itself never stops.

use kinelog_hal::OutputPin;

use crate::clock::format_timestamp;
use crate::config::UtcOffset;
use crate::sample::Sample;
use crate::session::SessionIdentity;
use crate::state::{Event, RecorderState};
use crate::store::{AppendOutcome, LogStore, StoreError};
use crate::traits::{ClockError, ClockSource, LogVolume, MotionSensor, SensorError};
use crate::trigger::TriggerPolicy;

/// Why a triggered sample was not written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DropReason<E> {
    /// Clock could not be read
    Clock(ClockError),
    /// Sensor could not be read
    Sensor(SensorError),
    /// Timestamp or row could not be formatted
    Format,
    /// Log file could not be created or appended
    Store(StoreError<E>),
}

impl<E> From<ClockError> for DropReason<E> {
    fn from(e: ClockError) -> Self {
        DropReason::Clock(e)
    }
}

impl<E> From<SensorError> for DropReason<E> {
    fn from(e: SensorError) -> Self {
        DropReason::Sensor(e)
    }
}

impl<E> From<StoreError<E>> for DropReason<E> {
    fn from(e: StoreError<E>) -> Self {
        DropReason::Store(e)
    }
}

/// Result of one [`Recorder::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleReport<E> {
    /// Trigger not asserted
    Idle,
    /// Row written; `created` if the file was created for it
    Recorded { created: bool },
    /// Sample lost
    Dropped(DropReason<E>),
}

/// The recorder context
pub struct Recorder<T, L, C, S, V> {
    trigger: T,
    indicator: L,
    clock: C,
    sensor: S,
    store: LogStore<V>,
    session: SessionIdentity,
    offset: UtcOffset,
    state: RecorderState,
}

impl<T, L, C, S, V> Recorder<T, L, C, S, V>
where
    T: TriggerPolicy,
    L: OutputPin,
    C: ClockSource,
    S: MotionSensor,
    V: LogVolume,
{
    /// Assemble the recorder for a booted session
    ///
    /// The indicator is driven off.
    pub fn new(
        trigger: T,
        indicator: L,
        clock: C,
        sensor: S,
        volume: V,
        session: SessionIdentity,
        offset: UtcOffset,
    ) -> Self {
        let mut recorder = Self {
            trigger,
            indicator,
            clock,
            sensor,
            store: LogStore::new(volume),
            session,
            offset,
            state: RecorderState::Idle,
        };
        recorder.show_state();
        recorder
    }

    pub fn session(&self) -> &SessionIdentity {
        &self.session
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn indicator(&self) -> &L {
        &self.indicator
    }

    pub fn store(&self) -> &LogStore<V> {
        &self.store
    }

    /// Poll the trigger once and run a sample cycle if it fired
    pub async fn step(&mut self) -> CycleReport<V::Error> {
        if !self.trigger.poll() {
            self.trigger.idle().await;
            return CycleReport::Idle;
        }

        self.handle(Event::TriggerAsserted);

        let report = match self.record() {
            Ok(outcome) => CycleReport::Recorded {
                created: outcome.created,
            },
            Err(reason) => CycleReport::Dropped(reason),
        };

        self.handle(Event::CycleComplete);
        self.trigger.throttle().await;

        report
    }

    fn handle(&mut self, event: Event) {
        self.state = self.state.transition(event);
        self.show_state();
    }

    /// Drive the indicator from the current state
    fn show_state(&mut self) {
        if self.state.indicator_on() {
            self.indicator.set_high();
        } else {
            self.indicator.set_low();
        }
    }

    /// Run forever, handing every non-idle report to `on_report`
    pub async fn run<F>(&mut self, mut on_report: F)
    where
        F: FnMut(&SessionIdentity, &CycleReport<V::Error>),
    {
        loop {
            let report = self.step().await;
            if !matches!(report, CycleReport::Idle) {
                on_report(&self.session, &report);
            }
        }
    }

    fn record(&mut self) -> Result<AppendOutcome, DropReason<V::Error>> {
        let event = self.sensor.read_event()?;
        let now = self.clock.now()?;

        let timestamp = format_timestamp(&now, self.offset).ok_or(DropReason::Format)?;
        let row = Sample::new(timestamp, event)
            .to_csv_row()
            .map_err(|_| DropReason::Format)?;

        Ok(self.store.append(&self.session, &row)?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::clock::{Date, DateTime};
    use crate::config::MotionConfig;
    use crate::sample::CSV_HEADER;
    use crate::store::tests::{mounted, MemError, MemVolume};
    use crate::traits::{MotionEvent, Vector3};
    use crate::trigger::testing::{ScriptedButton, VirtualDelay, VirtualTime};
    use crate::trigger::{LevelTrigger, TriggerTiming};
    use embassy_futures::block_on;

    pub(crate) struct FakeClock {
        pub now: DateTime,
        pub running: bool,
        pub present: bool,
        pub fail_reads: bool,
        pub adjusted: Option<DateTime>,
    }

    impl FakeClock {
        pub(crate) fn at(now: DateTime) -> Self {
            Self {
                now,
                running: true,
                present: true,
                fail_reads: false,
                adjusted: None,
            }
        }
    }

    impl ClockSource for FakeClock {
        fn is_running(&mut self) -> Result<bool, ClockError> {
            if !self.present {
                return Err(ClockError::Bus);
            }
            Ok(self.running)
        }

        fn now(&mut self) -> Result<DateTime, ClockError> {
            if !self.present || self.fail_reads {
                return Err(ClockError::Bus);
            }
            Ok(self.now)
        }

        fn adjust(&mut self, time: &DateTime) -> Result<(), ClockError> {
            if !self.present {
                return Err(ClockError::Bus);
            }
            self.now = *time;
            self.running = true;
            self.adjusted = Some(*time);
            Ok(())
        }
    }

    pub(crate) struct FakeSensor {
        pub present: bool,
        pub fail_reads: bool,
        pub configured: Option<MotionConfig>,
        pub event: MotionEvent,
    }

    impl Default for FakeSensor {
        fn default() -> Self {
            Self {
                present: true,
                fail_reads: false,
                configured: None,
                event: MotionEvent {
                    acceleration: Vector3::new(0.0, 0.0, 9.81),
                    gyro: Vector3::ZERO,
                    temperature_c: 25.0,
                },
            }
        }
    }

    impl MotionSensor for FakeSensor {
        fn configure(&mut self, config: &MotionConfig) -> Result<(), SensorError> {
            if !self.present {
                return Err(SensorError::NotFound);
            }
            self.configured = Some(*config);
            Ok(())
        }

        fn read_event(&mut self) -> Result<MotionEvent, SensorError> {
            if self.fail_reads {
                return Err(SensorError::Bus);
            }
            Ok(self.event)
        }
    }

    #[derive(Default)]
    pub(crate) struct FakeLed {
        pub high: bool,
        pub pulses: u32,
        /// Every level driven, in order
        pub levels: Vec<bool>,
    }

    impl OutputPin for FakeLed {
        fn set_high(&mut self) {
            if !self.high {
                self.pulses += 1;
            }
            self.high = true;
            self.levels.push(true);
        }

        fn set_low(&mut self) {
            self.high = false;
            self.levels.push(false);
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    pub(crate) type TestRecorder = Recorder<
        LevelTrigger<ScriptedButton, VirtualDelay>,
        FakeLed,
        FakeClock,
        FakeSensor,
        MemVolume,
    >;

    pub(crate) const THROTTLE_MS: u32 = 150;

    pub(crate) fn recorder(
        time: &VirtualTime,
        presses: &[(u64, u64)],
        clock: FakeClock,
        sensor: FakeSensor,
        volume: MemVolume,
        session: SessionIdentity,
    ) -> TestRecorder {
        let trigger = LevelTrigger::new(
            ScriptedButton::new(time, presses),
            time.delay(),
            TriggerTiming::new(THROTTLE_MS, 1),
        );
        Recorder::new(
            trigger,
            FakeLed::default(),
            clock,
            sensor,
            volume,
            session,
            UtcOffset::default(),
        )
    }

    /// Step until virtual time reaches `until_ms`, collecting non-idle reports
    pub(crate) fn run_until(
        recorder: &mut TestRecorder,
        time: &VirtualTime,
        until_ms: u64,
    ) -> Vec<CycleReport<MemError>> {
        let mut reports = Vec::new();
        while time.now_ms() < until_ms {
            let report = block_on(recorder.step());
            if !matches!(report, CycleReport::Idle) {
                reports.push(report);
            }
        }
        reports
    }

    fn session() -> SessionIdentity {
        SessionIdentity::new(Date::new(2024, 6, 1).unwrap(), 3)
    }

    fn noon() -> FakeClock {
        FakeClock::at(DateTime::new(2024, 6, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_idle_step_touches_nothing() {
        let time = VirtualTime::default();
        let mut rec = recorder(&time, &[], noon(), FakeSensor::default(), mounted(), session());

        assert_eq!(block_on(rec.step()), CycleReport::Idle);
        assert_eq!(rec.state(), RecorderState::Idle);
        assert_eq!(rec.indicator().pulses, 0);
        assert!(rec.store().volume().files.is_empty());
    }

    #[test]
    fn test_single_trigger_writes_header_and_row() {
        let time = VirtualTime::default();
        let mut rec = recorder(
            &time,
            &[(0, 10)],
            noon(),
            FakeSensor::default(),
            mounted(),
            session(),
        );

        let reports = run_until(&mut rec, &time, 1000);
        assert_eq!(reports, [CycleReport::Recorded { created: true }]);

        let text = rec.store().volume().contents(&session()).unwrap();
        assert_eq!(
            text,
            std::format!(
                "{}\r\n2024-06-01T19:00:00+07:00,0.00,0.00,9.81,0.00,0.00,0.00,25.00\r\n",
                CSV_HEADER
            )
        );
        assert_eq!(rec.indicator().pulses, 1);
        assert!(!rec.indicator().high);
        assert_eq!(rec.state(), RecorderState::Idle);
    }

    #[test]
    fn test_indicator_follows_recorder_state() {
        let time = VirtualTime::default();
        let led = FakeLed {
            high: true,
            ..Default::default()
        };
        let trigger = LevelTrigger::new(
            ScriptedButton::new(&time, &[(0, 10)]),
            time.delay(),
            TriggerTiming::new(THROTTLE_MS, 1),
        );
        let mut rec = Recorder::new(
            trigger,
            led,
            noon(),
            FakeSensor::default(),
            mounted(),
            session(),
            UtcOffset::default(),
        );
        // A lit indicator is cleared on construction
        assert_eq!(rec.indicator().levels, [false]);

        run_until(&mut rec, &time, 1000);
        assert_eq!(rec.indicator().levels, [false, true, false]);
        assert_eq!(rec.indicator().high, rec.state().indicator_on());
    }

    #[test]
    fn test_held_trigger_samples_once_per_interval() {
        let time = VirtualTime::default();
        let held = 3 * THROTTLE_MS as u64;
        let mut rec = recorder(
            &time,
            &[(0, held)],
            noon(),
            FakeSensor::default(),
            mounted(),
            session(),
        );

        let reports = run_until(&mut rec, &time, 2000);
        assert_eq!(
            reports,
            [
                CycleReport::Recorded { created: true },
                CycleReport::Recorded { created: false },
                CycleReport::Recorded { created: false },
            ]
        );
        let text = rec.store().volume().contents(&session()).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert_eq!(rec.indicator().pulses, 3);
    }

    #[test]
    fn test_sensor_failure_drops_sample() {
        let time = VirtualTime::default();
        let sensor = FakeSensor {
            fail_reads: true,
            ..Default::default()
        };
        let mut rec = recorder(&time, &[(0, 10)], noon(), sensor, mounted(), session());

        let reports = run_until(&mut rec, &time, 500);
        assert_eq!(
            reports,
            [CycleReport::Dropped(DropReason::Sensor(SensorError::Bus))]
        );
        assert!(rec.store().volume().files.is_empty());
        assert!(!rec.indicator().high);
    }

    #[test]
    fn test_clock_failure_drops_sample() {
        let time = VirtualTime::default();
        let clock = FakeClock {
            fail_reads: true,
            ..noon()
        };
        let mut rec = recorder(&time, &[(0, 10)], clock, FakeSensor::default(), mounted(), session());

        let reports = run_until(&mut rec, &time, 500);
        assert_eq!(
            reports,
            [CycleReport::Dropped(DropReason::Clock(ClockError::Bus))]
        );
    }

    #[test]
    fn test_store_failure_drops_sample_and_loop_continues() {
        let time = VirtualTime::default();
        let volume = MemVolume {
            fail_create: true,
            ..mounted()
        };
        let mut rec = recorder(
            &time,
            &[(0, 10), (400, 410)],
            noon(),
            FakeSensor::default(),
            volume,
            session(),
        );

        let reports = run_until(&mut rec, &time, 1000);
        assert_eq!(reports.len(), 2);
        for report in reports {
            assert_eq!(
                report,
                CycleReport::Dropped(DropReason::Store(StoreError::Create(MemError::Full)))
            );
        }
    }

    #[test]
    fn test_unformattable_timestamp_drops_sample() {
        let time = VirtualTime::default();
        // +7 h pushes past the last representable second
        let clock = FakeClock::at(DateTime::new(9999, 12, 31, 20, 0, 0).unwrap());
        let mut rec = recorder(&time, &[(0, 10)], clock, FakeSensor::default(), mounted(), session());

        let reports = run_until(&mut rec, &time, 500);
        assert_eq!(reports, [CycleReport::Dropped(DropReason::Format)]);
    }
}
