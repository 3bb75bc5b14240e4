use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Mode;

/// Every state change in the session produces an Event.
/// Front ends drain them from the session after each command or wakeup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimeAdjusted {
        delta_secs: i64,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A period ran out, was adjusted down to zero, or was skipped.
    PeriodCompleted {
        from: Mode,
        to: Mode,
        completed_work_cycles: u64,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A pending auto-start was scheduled after a transition.
    AutoStartScheduled {
        delay_ms: u64,
        at: DateTime<Utc>,
    },
    SettingsSaved {
        work: u32,
        short_break: u32,
        long_break: u32,
        cycles_before_long: u32,
        at: DateTime<Utc>,
    },
    /// Timer state was reloaded from a shutdown snapshot.
    SessionRestored {
        mode: Mode,
        remaining_secs: u64,
        completed_work_cycles: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: Mode,
        running: bool,
        remaining_secs: u64,
        total_secs: u64,
        completed_work_cycles: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Whether this event ended a period.
    pub fn is_period_completed(&self) -> bool {
        matches!(self, Event::PeriodCompleted { .. })
    }
}
