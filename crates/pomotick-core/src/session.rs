//! The session controller.
//!
//! A [`Session`] owns everything a running timer needs: the active settings,
//! the [`TimerEngine`], the scheduler that delivers ticks, the notifier and
//! the key-value store. Commands and wakeups are handled one at a time
//! through `&mut self`, so there is no shared state to lock.
//!
//! The session keeps the engine and the scheduler in step: whenever the
//! engine is running there is exactly one live tick source, and whenever it
//! is not there is none.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::display::Projection;
use crate::events::Event;
use crate::notify::Notifier;
use crate::scheduler::{ManualScheduler, ScheduleHandle, Scheduler, Wakeup, WakeupKind, TICK_PERIOD};
use crate::settings::{load_settings, persist_settings, Settings, SettingsCandidate};
use crate::storage::KeyValueStore;
use crate::timer::TimerEngine;

/// Key holding the shutdown snapshot.
pub const STATE_KEY: &str = "pomodoro.state";

/// Delay between a transition and the automatic start of the next period.
pub const DEFAULT_AUTO_START_DELAY: Duration = Duration::from_millis(500);

/// Most events kept for a front end that has not drained them yet.
pub const MAX_PENDING_EVENTS: usize = 256;

/// Timer state saved on shutdown for resumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub current: TimerEngine,
    pub settings: Settings,
}

impl SessionSnapshot {
    /// Read the shutdown snapshot from `store` without removing it.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or the payload is not a
    /// snapshot.
    pub fn load<K: KeyValueStore + ?Sized>(store: &K) -> crate::error::Result<Option<Self>> {
        match store.get(STATE_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// The saved timer as a resumed session sees it: same position, paused.
    pub fn paused_engine(&self) -> TimerEngine {
        self.current.clone().into_restored()
    }
}

/// Parse a raw time adjustment, in seconds.
///
/// Integers pass through and finite decimals truncate toward zero. Anything
/// else, including NaN and infinities, is rejected.
pub fn parse_adjustment(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return Some(secs);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
        .map(|f| f.trunc() as i64)
}

/// A running timer with its settings, tick source and outbox.
///
/// Commands and wakeups append [`Event`]s to an outbox that front ends read
/// with [`drain_events`](Self::drain_events). Only the newest
/// [`MAX_PENDING_EVENTS`] are kept between drains.
pub struct Session<S, N, K> {
    settings: Settings,
    engine: TimerEngine,
    scheduler: S,
    notifier: N,
    store: K,
    tick: Option<ScheduleHandle>,
    pending_auto_start: Option<ScheduleHandle>,
    auto_start_delay: Duration,
    events: VecDeque<Event>,
}

impl<S: Scheduler, N: Notifier, K: KeyValueStore> Session<S, N, K> {
    /// Create a session with settings loaded from `store`.
    ///
    /// The timer starts at the beginning of a Work period, paused.
    pub fn new(scheduler: S, notifier: N, store: K) -> Self {
        let settings = load_settings(&store);
        let engine = TimerEngine::new(&settings);
        info!(
            "Session created: work={}min short={}min long={}min cycles_before_long={}",
            settings.work, settings.short_break, settings.long_break, settings.cycles_before_long
        );
        Self {
            settings,
            engine,
            scheduler,
            notifier,
            store,
            tick: None,
            pending_auto_start: None,
            auto_start_delay: DEFAULT_AUTO_START_DELAY,
            events: VecDeque::new(),
        }
    }

    pub fn with_auto_start_delay(mut self, delay: Duration) -> Self {
        self.auto_start_delay = delay;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn projection(&self) -> Projection {
        Projection::new(&self.engine, &self.settings)
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot(&self.settings)
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    /// Whether an automatic start is waiting for its delay to elapse.
    pub fn is_auto_start_pending(&self) -> bool {
        self.pending_auto_start.is_some()
    }

    /// Take all events recorded since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) {
        self.cancel_auto_start();
        self.start_countdown();
    }

    pub fn pause(&mut self) {
        self.cancel_auto_start();
        if let Some(event) = self.engine.pause() {
            debug!("Paused with {}s remaining", self.engine.remaining_secs());
            self.record(event);
        }
        self.sync_tick_source();
    }

    pub fn toggle(&mut self) {
        if self.engine.is_running() {
            self.pause();
        } else {
            self.start();
        }
    }

    pub fn reset(&mut self) {
        self.cancel_auto_start();
        let event = self.engine.reset(&self.settings);
        self.record(event);
        self.sync_tick_source();
    }

    /// End the current period now, whatever its remaining time.
    pub fn skip(&mut self) {
        self.cancel_auto_start();
        let event = self.engine.skip(&self.settings);
        self.finish_period(event);
    }

    /// Shift the remaining time by whole seconds, never below zero.
    ///
    /// Reaching exactly zero from a positive value ends the period as if it
    /// had run out.
    pub fn adjust_time(&mut self, delta_secs: i64) {
        self.cancel_auto_start();
        for event in self.engine.adjust_time(delta_secs, &self.settings) {
            if event.is_period_completed() {
                self.finish_period(event);
            } else {
                self.record(event);
            }
        }
    }

    /// Adjust by a raw, user-typed amount of seconds.
    ///
    /// Returns false, leaving the session untouched, when `raw` is not a number.
    pub fn adjust_time_input(&mut self, raw: &str) -> bool {
        match parse_adjustment(raw) {
            Some(delta_secs) => {
                self.adjust_time(delta_secs);
                true
            }
            None => {
                debug!("Ignoring non-numeric time adjustment {:?}", raw);
                false
            }
        }
    }

    /// Normalize, persist and apply new settings.
    ///
    /// A failed write is logged and the settings are applied anyway. When the
    /// timer is idle the remaining time is reloaded for the current mode; a
    /// running countdown is left alone until its next reset or transition.
    pub fn save_settings(&mut self, candidate: &SettingsCandidate) -> &Settings {
        let settings = candidate.normalize();
        if let Err(e) = persist_settings(&self.store, &settings) {
            warn!("Failed to persist settings: {}", e);
        }
        info!(
            "Settings saved: work={}min short={}min long={}min cycles_before_long={} sound={} auto_start={}",
            settings.work,
            settings.short_break,
            settings.long_break,
            settings.cycles_before_long,
            settings.sound_enabled,
            settings.auto_start
        );
        self.settings = settings;
        self.engine.apply_settings(&self.settings);
        self.record(Event::SettingsSaved {
            work: self.settings.work,
            short_break: self.settings.short_break,
            long_break: self.settings.long_break,
            cycles_before_long: self.settings.cycles_before_long,
            at: Utc::now(),
        });
        &self.settings
    }

    /// Handle a fired scheduler job.
    ///
    /// Wakeups from cancelled sources are dropped, so a tick already in
    /// flight when the timer was paused never reaches the engine.
    pub fn handle_wakeup(&mut self, wakeup: Wakeup) {
        match wakeup.kind {
            WakeupKind::Tick if self.tick == Some(wakeup.handle) => {
                if let Some(event) = self.engine.tick(&self.settings) {
                    self.finish_period(event);
                }
            }
            WakeupKind::AutoStart if self.pending_auto_start == Some(wakeup.handle) => {
                self.pending_auto_start = None;
                debug!("Auto-start delay elapsed");
                self.start_countdown();
            }
            _ => debug!(handle = wakeup.handle.id(), kind = ?wakeup.kind, "Ignoring stale wakeup"),
        }
    }

    /// Reload the timer from the shutdown snapshot, if one exists.
    ///
    /// The restored timer is paused and the snapshot is removed. Settings
    /// stay as loaded from the settings key. Returns whether a snapshot was
    /// applied.
    pub fn restore(&mut self) -> bool {
        let loaded = SessionSnapshot::load(&self.store);
        if !matches!(loaded, Ok(None)) {
            if let Err(e) = self.store.remove(STATE_KEY) {
                warn!("Failed to clear saved session: {}", e);
            }
        }
        let snapshot = match loaded {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return false,
            Err(e) => {
                warn!("Ignoring unreadable saved session: {}", e);
                return false;
            }
        };

        self.cancel_auto_start();
        self.engine = snapshot.paused_engine();
        self.sync_tick_source();
        info!(
            "Restored {} with {}s remaining after {} cycles",
            self.engine.mode(),
            self.engine.remaining_secs(),
            self.engine.completed_work_cycles()
        );
        self.record(Event::SessionRestored {
            mode: self.engine.mode(),
            remaining_secs: self.engine.remaining_secs(),
            completed_work_cycles: self.engine.completed_work_cycles(),
            at: Utc::now(),
        });
        true
    }

    /// Stop all scheduled work, saving a snapshot if a countdown was running.
    pub fn shutdown(&mut self) {
        if self.engine.is_running() {
            let snapshot = SessionSnapshot {
                current: self.engine.clone(),
                settings: self.settings.clone(),
            };
            match serde_json::to_string(&snapshot) {
                Ok(json) => match self.store.set(STATE_KEY, &json) {
                    Ok(()) => info!("Saved running session for resumption"),
                    Err(e) => warn!("Failed to save session: {}", e),
                },
                Err(e) => warn!("Failed to encode session: {}", e),
            }
        }
        self.cancel_auto_start();
        if let Some(handle) = self.tick.take() {
            self.scheduler.cancel(handle);
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn record(&mut self, event: Event) {
        if self.events.len() == MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    fn start_countdown(&mut self) {
        if let Some(event) = self.engine.start() {
            debug!(
                "Started {} with {}s remaining",
                self.engine.mode(),
                self.engine.remaining_secs()
            );
            self.record(event);
        }
        self.sync_tick_source();
    }

    /// Make the tick source match the engine's running flag.
    fn sync_tick_source(&mut self) {
        match (self.engine.is_running(), self.tick) {
            (true, None) => {
                self.tick = Some(
                    self.scheduler
                        .schedule_recurring(TICK_PERIOD, WakeupKind::Tick),
                );
            }
            (false, Some(handle)) => {
                self.scheduler.cancel(handle);
                self.tick = None;
            }
            _ => {}
        }
    }

    fn cancel_auto_start(&mut self) {
        if let Some(handle) = self.pending_auto_start.take() {
            debug!("Cancelling pending auto-start");
            self.scheduler.cancel(handle);
        }
    }

    /// Side effects of a transition the engine has already applied.
    fn finish_period(&mut self, event: Event) {
        if let Event::PeriodCompleted {
            from,
            to,
            completed_work_cycles,
            ..
        } = &event
        {
            info!("{} finished, next: {} (cycles: {})", from, to, completed_work_cycles);
        }
        self.record(event);
        self.sync_tick_source();

        if self.settings.sound_enabled {
            if let Err(e) = self.notifier.play_cue() {
                debug!("Notification cue failed: {}", e);
            }
        }

        if self.settings.auto_start {
            self.cancel_auto_start();
            self.pending_auto_start = Some(
                self.scheduler
                    .schedule_once(self.auto_start_delay, WakeupKind::AutoStart),
            );
            self.record(Event::AutoStartScheduled {
                delay_ms: u64::try_from(self.auto_start_delay.as_millis()).unwrap_or(u64::MAX),
                at: Utc::now(),
            });
        }
    }
}

impl<N: Notifier, K: KeyValueStore> Session<ManualScheduler, N, K> {
    /// Run the virtual clock forward by `by`, handling every wakeup that
    /// falls due on the way.
    pub fn advance(&mut self, by: Duration) {
        let until = self.scheduler.now() + by;
        while let Some(wakeup) = self.scheduler.next_due(until) {
            self.handle_wakeup(wakeup);
        }
        self.scheduler.advance_to(until);
    }
}
