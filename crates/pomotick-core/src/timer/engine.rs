//! Timer engine implementation.
//!
//! The timer engine is a tick-driven state machine. It owns no clock and no
//! threads: the session feeds it one `tick()` per elapsed second while it is
//! running, and decides how to schedule those ticks.
//!
//! ## Modes
//!
//! ```text
//! Work -> (ShortBreak | LongBreak) -> Work -> ...
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(&settings);
//! engine.start();
//! // Once per second while running:
//! engine.tick(&settings); // Returns Some(Event::PeriodCompleted) when the period ends
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::mode::Mode;
use super::transition::next_period;
use crate::events::Event;
use crate::settings::Settings;

/// Core timer state.
///
/// Serialized as the `current` half of the shutdown snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerEngine {
    mode: Mode,
    /// Seconds left in the current period.
    #[serde(rename = "remaining")]
    remaining_secs: u64,
    running: bool,
    /// Work periods completed this session.
    #[serde(rename = "cycles", default)]
    completed_work_cycles: u64,
}

impl TimerEngine {
    /// Create a new engine at the start of a Work period, not running.
    pub fn new(settings: &Settings) -> Self {
        Self {
            mode: Mode::Work,
            remaining_secs: Mode::Work.duration_secs(settings),
            running: false,
            completed_work_cycles: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn completed_work_cycles(&self) -> u64 {
        self.completed_work_cycles
    }

    pub fn total_secs(&self, settings: &Settings) -> u64 {
        self.mode.duration_secs(settings)
    }

    /// 0.0 .. 1.0 progress within the current period.
    ///
    /// Clamped, since manual adjustments can push remaining time above the
    /// configured total.
    pub fn progress(&self, settings: &Settings) -> f64 {
        let total = self.total_secs(settings);
        if total == 0 {
            return 0.0;
        }
        let elapsed = total as f64 - self.remaining_secs as f64;
        (elapsed / total as f64).clamp(0.0, 1.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, settings: &Settings) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            running: self.running,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(settings),
            completed_work_cycles: self.completed_work_cycles,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        Some(Event::TimerStarted {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn toggle(&mut self) -> Option<Event> {
        if self.running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Stop the countdown and reload the current mode's full duration.
    /// Mode and cycle count are untouched.
    pub fn reset(&mut self, settings: &Settings) -> Event {
        self.running = false;
        self.remaining_secs = self.mode.duration_secs(settings);
        Event::TimerReset {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Shift the remaining time by `delta_secs`, never below zero.
    ///
    /// Returns the adjustment event, followed by a `PeriodCompleted` event
    /// when the adjustment took a positive remaining time down to zero.
    pub fn adjust_time(&mut self, delta_secs: i64, settings: &Settings) -> Vec<Event> {
        let before = self.remaining_secs;
        self.remaining_secs = if delta_secs >= 0 {
            before.saturating_add(delta_secs.unsigned_abs())
        } else {
            before.saturating_sub(delta_secs.unsigned_abs())
        };

        let mut events = vec![Event::TimeAdjusted {
            delta_secs,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }];
        if before > 0 && self.remaining_secs == 0 {
            events.push(self.complete_period(settings));
        }
        events
    }

    /// Call once per elapsed second while running.
    ///
    /// A tick that finds the period already at zero completes it instead of
    /// decrementing, so a boundary reached by the previous tick (or by an
    /// adjustment) is never skipped. Returns `Some(Event::PeriodCompleted)`
    /// in that case.
    pub fn tick(&mut self, settings: &Settings) -> Option<Event> {
        if !self.running {
            return None;
        }
        if self.remaining_secs == 0 {
            return Some(self.complete_period(settings));
        }
        self.remaining_secs -= 1;
        None
    }

    /// End the current period immediately, whatever the remaining time.
    pub fn skip(&mut self, settings: &Settings) -> Event {
        self.complete_period(settings)
    }

    /// Reload the remaining time for new durations when idle.
    ///
    /// A running countdown keeps its remaining time until the next reset or
    /// transition. Returns whether the remaining time was recomputed.
    pub fn apply_settings(&mut self, settings: &Settings) -> bool {
        if self.running {
            return false;
        }
        self.remaining_secs = self.mode.duration_secs(settings);
        true
    }

    /// Bring a deserialized engine back into a valid idle state.
    pub(crate) fn into_restored(mut self) -> Self {
        self.running = false;
        self
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_period(&mut self, settings: &Settings) -> Event {
        let from = self.mode;
        self.running = false;
        let next = next_period(from, self.completed_work_cycles, settings);
        self.mode = next.mode;
        self.completed_work_cycles = next.completed_work_cycles;
        self.remaining_secs = next.remaining_secs;
        Event::PeriodCompleted {
            from,
            to: next.mode,
            completed_work_cycles: next.completed_work_cycles,
            remaining_secs: next.remaining_secs,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn one_minute_settings() -> Settings {
        Settings {
            work: 1,
            short_break: 1,
            long_break: 1,
            cycles_before_long: 2,
            ..Settings::default()
        }
    }

    #[test]
    fn starts_idle_in_work() {
        let settings = Settings::default();
        let engine = TimerEngine::new(&settings);
        assert_eq!(engine.mode(), Mode::Work);
        assert_eq!(engine.remaining_secs(), 25 * 60);
        assert!(!engine.is_running());
        assert_eq!(engine.completed_work_cycles(), 0);
    }

    #[test]
    fn start_and_pause_are_idempotent() {
        let mut engine = TimerEngine::new(&Settings::default());
        assert!(engine.start().is_some());
        assert!(engine.start().is_none());
        assert!(engine.is_running());

        assert!(engine.pause().is_some());
        assert!(engine.pause().is_none());
        assert!(!engine.is_running());
    }

    #[test]
    fn toggle_flips_running() {
        let mut engine = TimerEngine::new(&Settings::default());
        engine.toggle();
        assert!(engine.is_running());
        engine.toggle();
        assert!(!engine.is_running());
    }

    #[test]
    fn tick_reaches_zero_before_transitioning() {
        let settings = one_minute_settings();
        let mut engine = TimerEngine::new(&settings);
        engine.adjust_time(-59, &settings);
        engine.start();
        assert_eq!(engine.remaining_secs(), 1);

        assert!(engine.tick(&settings).is_none());
        assert_eq!(engine.remaining_secs(), 0);
        assert_eq!(engine.mode(), Mode::Work);

        let event = engine.tick(&settings).expect("expiry");
        assert!(event.is_period_completed());
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert!(!engine.is_running());
    }

    #[test]
    fn tick_is_ignored_while_paused() {
        let settings = Settings::default();
        let mut engine = TimerEngine::new(&settings);
        assert!(engine.tick(&settings).is_none());
        assert_eq!(engine.remaining_secs(), 25 * 60);
    }

    #[test]
    fn adjust_to_zero_transitions_once() {
        let settings = Settings::default();
        let mut engine = TimerEngine::new(&settings);
        engine.adjust_time(-(25 * 60 - 30), &settings);
        assert_eq!(engine.remaining_secs(), 30);

        let events = engine.adjust_time(-1000, &settings);
        assert_eq!(events.len(), 2);
        assert_eq!(events.iter().filter(|e| e.is_period_completed()).count(), 1);
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert_eq!(engine.completed_work_cycles(), 1);
    }

    #[test]
    fn adjust_at_zero_does_not_transition() {
        let settings = one_minute_settings();
        let mut engine = TimerEngine::new(&settings);
        engine.start();
        for _ in 0..60 {
            engine.tick(&settings);
        }
        assert_eq!(engine.remaining_secs(), 0);

        let events = engine.adjust_time(-60, &settings);
        assert_eq!(events.len(), 1);
        assert_eq!(engine.mode(), Mode::Work);
    }

    #[test]
    fn adjust_up_keeps_mode() {
        let settings = Settings::default();
        let mut engine = TimerEngine::new(&settings);
        engine.adjust_time(60, &settings);
        assert_eq!(engine.remaining_secs(), 26 * 60);
        assert_eq!(engine.mode(), Mode::Work);
        assert_eq!(engine.progress(&settings), 0.0);
    }

    #[test]
    fn skip_works_while_paused() {
        let settings = Settings::default();
        let mut engine = TimerEngine::new(&settings);
        engine.skip(&settings);
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert_eq!(engine.remaining_secs(), 5 * 60);
        engine.skip(&settings);
        assert_eq!(engine.mode(), Mode::Work);
        assert_eq!(engine.completed_work_cycles(), 1);
    }

    #[test]
    fn apply_settings_only_when_idle() {
        let settings = Settings::default();
        let mut engine = TimerEngine::new(&settings);
        let longer = Settings {
            work: 50,
            ..Settings::default()
        };
        assert!(engine.apply_settings(&longer));
        assert_eq!(engine.remaining_secs(), 50 * 60);

        engine.start();
        engine.tick(&longer);
        assert!(!engine.apply_settings(&settings));
        assert_eq!(engine.remaining_secs(), 50 * 60 - 1);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let engine = TimerEngine::new(&Settings::default());
        match engine.snapshot(&Settings::default()) {
            Event::StateSnapshot {
                mode,
                running,
                remaining_secs,
                total_secs,
                ..
            } => {
                assert_eq!(mode, Mode::Work);
                assert!(!running);
                assert_eq!(remaining_secs, 25 * 60);
                assert_eq!(total_secs, 25 * 60);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    #[test]
    fn serializes_like_the_shutdown_snapshot() {
        let engine = TimerEngine::new(&Settings::default());
        let json = serde_json::to_value(&engine).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"mode": "work", "remaining": 1500, "running": false, "cycles": 0})
        );
    }

    proptest! {
        #[test]
        fn reset_reloads_configured_duration(
            work in 1u32..600,
            short in 1u32..600,
            long in 1u32..600,
            skips in 0usize..9,
            delta in -5000i64..5000,
        ) {
            let settings = Settings {
                work,
                short_break: short,
                long_break: long,
                ..Settings::default()
            };
            let mut engine = TimerEngine::new(&settings);
            for _ in 0..skips {
                engine.skip(&settings);
            }
            engine.start();
            engine.adjust_time(delta, &settings);
            engine.reset(&settings);
            prop_assert!(!engine.is_running());
            prop_assert_eq!(
                engine.remaining_secs(),
                u64::from(engine.mode().duration_min(&settings)) * 60
            );
        }
    }
}
