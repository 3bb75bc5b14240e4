use std::time::Duration;

use super::{ScheduleHandle, Scheduler, Wakeup, WakeupKind};

#[derive(Debug, Clone)]
struct Job {
    handle: ScheduleHandle,
    kind: WakeupKind,
    due: Duration,
    period: Option<Duration>,
}

/// Scheduler driven by a virtual clock.
///
/// Nothing fires on its own: the owner pulls due wakeups with
/// [`next_due`](Self::next_due), which moves the clock forward to each job's
/// due time in order. Jobs scheduled while handling a wakeup are placed
/// relative to that wakeup's time.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    jobs: Vec<Job>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of live jobs.
    pub fn pending(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_scheduled(&self, handle: ScheduleHandle) -> bool {
        self.jobs.iter().any(|job| job.handle == handle)
    }

    /// Pop the earliest job due at or before `until`.
    ///
    /// Advances the clock to the job's due time. Recurring jobs are re-armed
    /// one period later; one-shot jobs are removed. Ties fire in scheduling
    /// order.
    pub fn next_due(&mut self, until: Duration) -> Option<Wakeup> {
        let index = self
            .jobs
            .iter()
            .enumerate()
            .filter(|(_, job)| job.due <= until)
            .min_by_key(|(_, job)| (job.due, job.handle))
            .map(|(index, _)| index)?;

        let Job {
            handle,
            kind,
            due,
            period,
        } = self.jobs[index].clone();
        self.now = self.now.max(due);
        match period {
            Some(period) => self.jobs[index].due = due + period,
            None => {
                self.jobs.remove(index);
            }
        }
        Some(Wakeup { handle, kind })
    }

    /// Move the clock to `to` without firing anything.
    pub fn advance_to(&mut self, to: Duration) {
        self.now = self.now.max(to);
    }

    fn push(&mut self, delay: Duration, period: Option<Duration>, kind: WakeupKind) -> ScheduleHandle {
        self.next_id += 1;
        let handle = ScheduleHandle::from_raw(self.next_id);
        self.jobs.push(Job {
            handle,
            kind,
            due: self.now + delay,
            period,
        });
        handle
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_recurring(&mut self, period: Duration, kind: WakeupKind) -> ScheduleHandle {
        // A zero period would fire forever without moving the clock.
        let period = period.max(Duration::from_millis(1));
        self.push(period, Some(period), kind)
    }

    fn schedule_once(&mut self, delay: Duration, kind: WakeupKind) -> ScheduleHandle {
        self.push(delay, None, kind)
    }

    fn cancel(&mut self, handle: ScheduleHandle) {
        self.jobs.retain(|job| job.handle != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn recurring_job_fires_each_period() {
        let mut scheduler = ManualScheduler::new();
        let handle = scheduler.schedule_recurring(SECOND, WakeupKind::Tick);

        let mut fired = 0;
        while let Some(wakeup) = scheduler.next_due(3 * SECOND) {
            assert_eq!(wakeup.handle, handle);
            fired += 1;
        }
        assert_eq!(fired, 3);
        assert_eq!(scheduler.now(), 3 * SECOND);
        assert!(scheduler.is_scheduled(handle));
    }

    #[test]
    fn one_shot_fires_once_in_due_order() {
        let mut scheduler = ManualScheduler::new();
        let tick = scheduler.schedule_recurring(SECOND, WakeupKind::Tick);
        let once = scheduler.schedule_once(Duration::from_millis(500), WakeupKind::AutoStart);

        let first = scheduler.next_due(2 * SECOND).unwrap();
        assert_eq!(first.handle, once);
        assert_eq!(first.kind, WakeupKind::AutoStart);
        assert_eq!(scheduler.now(), Duration::from_millis(500));

        assert_eq!(scheduler.next_due(2 * SECOND).unwrap().handle, tick);
        assert_eq!(scheduler.next_due(2 * SECOND).unwrap().handle, tick);
        assert!(scheduler.next_due(2 * SECOND).is_none());
        assert!(!scheduler.is_scheduled(once));
    }

    #[test]
    fn cancelled_jobs_never_fire() {
        let mut scheduler = ManualScheduler::new();
        let handle = scheduler.schedule_recurring(SECOND, WakeupKind::Tick);
        scheduler.cancel(handle);
        scheduler.cancel(handle);
        assert!(scheduler.next_due(10 * SECOND).is_none());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn jobs_are_relative_to_current_time() {
        let mut scheduler = ManualScheduler::new();
        scheduler.advance_to(5 * SECOND);
        scheduler.schedule_once(SECOND, WakeupKind::AutoStart);
        assert!(scheduler.next_due(5 * SECOND).is_none());
        assert!(scheduler.next_due(6 * SECOND).is_some());
    }
}
