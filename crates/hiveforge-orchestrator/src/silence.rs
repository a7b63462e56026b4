// hiveforge-orchestrator/src/silence.rs
// ============================================================================
// Module: Silence Detector & Heartbeat Manager
// Description: Per-run inactivity watchdog backed by a background tokio task
//              (§4.11).
// Dependencies: hiveforge_core::{Clock, Event}, hiveforge_storage::AkashicRecord, tokio::time
// ============================================================================

//! ## Overview
//! `record_activity` resets a per-run clock every time the run does
//! anything observable. A background task wakes every `interval_seconds`
//! and, if more than `2 * interval_seconds` has elapsed since the last
//! recorded activity, appends `SYSTEM_SILENCE_DETECTED` to the run stream
//! and invokes a caller-supplied callback, then resets its own clock so it
//! does not fire again on the very next tick (§4.11). This reset happens
//! *after* the callback runs, so a second silence that begins during
//! callback execution is not observed until a further
//! `2 * interval_seconds` have elapsed — a known, deliberately
//! unresolved gap (§9).
//!
//! [`HeartbeatManager`] multiplexes one [`SilenceDetector`] and its
//! background task per run, so callers never juggle `JoinHandle`s by hand.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use hiveforge_core::Actor;
use hiveforge_core::Clock;
use hiveforge_core::Payload;
use hiveforge_core::RunId;
use hiveforge_core::Timestamp;
use hiveforge_storage::AkashicRecord;
use tokio::task::JoinHandle;

use crate::eventlog::append_event;

/// Raised when a run has gone silent for longer than its configured
/// threshold (§4.11).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SilenceEvent {
    /// The run that went silent.
    pub run_id: RunId,
    /// Seconds elapsed since the last recorded activity.
    pub silent_for_seconds: i64,
}

/// Per-run inactivity timer (§4.11). Cheap to clone: the shared clock state
/// lives behind an `Arc`.
#[derive(Clone)]
pub struct SilenceDetector {
    run_id: RunId,
    interval_seconds: u64,
    last_activity: Arc<StdMutex<Timestamp>>,
    clock: Arc<dyn Clock>,
}

impl SilenceDetector {
    /// Builds a detector for `run_id`, seeded with `clock.now()` as the
    /// initial last-activity instant.
    #[must_use]
    pub fn new(run_id: RunId, interval_seconds: u64, clock: Arc<dyn Clock>) -> Self {
        let last_activity = Arc::new(StdMutex::new(clock.now()));
        Self { run_id, interval_seconds, last_activity, clock }
    }

    /// Resets the silence clock to the current instant.
    pub fn record_activity(&self) {
        let now = self.clock.now();
        #[expect(clippy::unwrap_used, reason = "poisoned only if an earlier caller panicked while holding the lock")]
        let mut last_activity = self.last_activity.lock().unwrap();
        *last_activity = now;
    }

    /// Seconds elapsed since the last recorded activity, as of `now`.
    #[must_use]
    pub fn silent_for_seconds(&self, now: Timestamp) -> i64 {
        #[expect(clippy::unwrap_used, reason = "poisoned only if an earlier caller panicked while holding the lock")]
        let last_activity = *self.last_activity.lock().unwrap();
        (now.as_offset_date_time() - last_activity.as_offset_date_time()).whole_seconds()
    }

    /// Spawns the background watchdog task: wakes every `interval_seconds`
    /// and, if silent for more than `2 * interval_seconds`, appends
    /// `SYSTEM_SILENCE_DETECTED` to `record`'s stream for this run, invokes
    /// `on_silence`, and resets its own clock to avoid flapping (§4.11).
    /// Cancel the returned handle to stop watching.
    pub fn spawn<F>(self, record: Arc<AkashicRecord>, on_silence: F) -> JoinHandle<()>
    where
        F: Fn(SilenceEvent) + Send + Sync + 'static,
    {
        tokio::spawn(async move {
            let threshold = i64::try_from(self.interval_seconds).unwrap_or(i64::MAX).saturating_mul(2);
            loop {
                tokio::time::sleep(Duration::from_secs(self.interval_seconds)).await;
                let now = self.clock.now();
                let silent_for = self.silent_for_seconds(now);
                if silent_for <= threshold {
                    continue;
                }

                let mut payload = Payload::new();
                if let Ok(value) = hiveforge_core::PayloadValue::float(precise_as_f64(silent_for)) {
                    payload.insert("silent_for_seconds".to_string(), value);
                }
                if append_event(
                    &record,
                    self.clock.as_ref(),
                    &self.run_id,
                    hiveforge_core::EventType::SystemSilenceDetected,
                    None,
                    None,
                    None,
                    Actor::system(),
                    payload,
                )
                .is_err()
                {
                    tracing::warn!(run_id = %self.run_id, "failed to append silence-detected event");
                }

                on_silence(SilenceEvent { run_id: self.run_id.clone(), silent_for_seconds: silent_for });
                self.record_activity();
            }
        })
    }
}

#[allow(clippy::cast_precision_loss, reason = "silence durations are small enough to round-trip exactly as f64 seconds")]
const fn precise_as_f64(value: i64) -> f64 {
    value as f64
}

/// Multiplexes one [`SilenceDetector`] and background task per run (§4.11).
#[derive(Default)]
pub struct HeartbeatManager {
    /// Live detectors and their background task handles, keyed by run id.
    detectors: StdMutex<HashMap<String, (SilenceDetector, JoinHandle<()>)>>,
}

impl HeartbeatManager {
    /// Builds an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts watching `run_id`: builds a fresh [`SilenceDetector`] and
    /// spawns its background task. Replaces and stops any detector already
    /// registered for this run.
    pub fn start<F>(&self, run_id: RunId, interval_seconds: u64, clock: Arc<dyn Clock>, record: Arc<AkashicRecord>, on_silence: F)
    where
        F: Fn(SilenceEvent) + Send + Sync + 'static,
    {
        self.stop(&run_id);
        let detector = SilenceDetector::new(run_id.clone(), interval_seconds, clock);
        let handle = detector.clone().spawn(record, on_silence);
        #[expect(clippy::unwrap_used, reason = "poisoned only if an earlier caller panicked while holding the lock")]
        self.detectors.lock().unwrap().insert(run_id.into_string(), (detector, handle));
    }

    /// Resets the silence clock for `run_id`, if it is being watched.
    pub fn record_activity(&self, run_id: &RunId) {
        #[expect(clippy::unwrap_used, reason = "poisoned only if an earlier caller panicked while holding the lock")]
        let detectors = self.detectors.lock().unwrap();
        if let Some((detector, _handle)) = detectors.get(run_id.as_str()) {
            detector.record_activity();
        }
    }

    /// Stops watching `run_id`, aborting its background task.
    pub fn stop(&self, run_id: &RunId) {
        #[expect(clippy::unwrap_used, reason = "poisoned only if an earlier caller panicked while holding the lock")]
        let mut detectors = self.detectors.lock().unwrap();
        if let Some((_detector, handle)) = detectors.remove(run_id.as_str()) {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use hiveforge_core::SystemClock;

    use super::*;

    #[test]
    fn silent_for_seconds_reflects_elapsed_time() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let detector = SilenceDetector::new(RunId::new("run-1"), 30, Arc::clone(&clock));
        let later = Timestamp::new(clock.now().as_offset_date_time() + time::Duration::seconds(90));
        assert!(detector.silent_for_seconds(later) >= 89);
    }

    #[test]
    fn record_activity_resets_the_clock() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let detector = SilenceDetector::new(RunId::new("run-1"), 30, Arc::clone(&clock));
        detector.record_activity();
        assert!(detector.silent_for_seconds(clock.now()) <= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_the_interval_elapses_without_activity() {
        let dir = tempfile::tempdir().expect("tempdir");
        let record = Arc::new(AkashicRecord::open(dir.path()).expect("open record"));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let detector = SilenceDetector::new(RunId::new("run-1"), 1, Arc::clone(&clock));

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        let handle = detector.spawn(Arc::clone(&record), move |_event| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::advance(Duration::from_secs(5)).await;
        for _ in 0 .. 8 {
            tokio::task::yield_now().await;
        }
        handle.abort();

        assert!(fired.load(Ordering::SeqCst) >= 1);
        let events = record.replay("run-1").expect("replay");
        assert!(events.iter().any(|event| event.event_type == hiveforge_core::EventType::SystemSilenceDetected));
    }
}
