//! Tick and delayed-start scheduling.
//!
//! The session never sleeps or spawns on its own. It asks a [`Scheduler`] for
//! a recurring tick while the timer runs and for a one-shot wakeup when an
//! automatic start is due, and it gets back a [`ScheduleHandle`] it can
//! cancel. Fired wakeups carry their handle, so the session can drop any
//! wakeup whose source it has already cancelled.
//!
//! Two implementations ship with the crate:
//! - [`TokioScheduler`] delivers wakeups through an mpsc channel from tokio
//!   tasks, for the live CLI
//! - [`ManualScheduler`] keeps a virtual clock that tests advance explicitly

mod manual;
mod runtime;

pub use manual::ManualScheduler;
pub use runtime::TokioScheduler;

use std::time::Duration;

/// Period of the countdown tick.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Identifies one scheduled job for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScheduleHandle(u64);

impl ScheduleHandle {
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// What a wakeup asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeupKind {
    /// One second of countdown elapsed.
    Tick,
    /// The delay after a transition elapsed; start the next period.
    AutoStart,
}

/// A fired job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wakeup {
    pub handle: ScheduleHandle,
    pub kind: WakeupKind,
}

/// Injectable timer capability.
pub trait Scheduler {
    /// Fire `kind` every `period`, first after one full period.
    fn schedule_recurring(&mut self, period: Duration, kind: WakeupKind) -> ScheduleHandle;

    /// Fire `kind` once after `delay`.
    fn schedule_once(&mut self, delay: Duration, kind: WakeupKind) -> ScheduleHandle;

    /// Stop a job. Cancelling an unknown or finished job is a no-op.
    fn cancel(&mut self, handle: ScheduleHandle);
}
