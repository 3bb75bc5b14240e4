use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};
use tracing::debug;

use super::{ScheduleHandle, Scheduler, Wakeup, WakeupKind};

/// Scheduler backed by tokio tasks.
///
/// Each job is a spawned task that sends its wakeups into a shared unbounded
/// channel; the receiver half goes to the event loop that owns the session.
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<Wakeup>,
    next_id: u64,
    tasks: HashMap<ScheduleHandle, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Wakeup>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tx,
            next_id: 0,
            tasks: HashMap::new(),
        };
        (scheduler, rx)
    }

    fn next_handle(&mut self) -> ScheduleHandle {
        self.tasks.retain(|_, task| !task.is_finished());
        self.next_id += 1;
        ScheduleHandle::from_raw(self.next_id)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_recurring(&mut self, period: Duration, kind: WakeupKind) -> ScheduleHandle {
        let handle = self.next_handle();
        let tx = self.tx.clone();
        let period = period.max(Duration::from_millis(1));
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(Wakeup { handle, kind }).is_err() {
                    break;
                }
            }
        });
        debug!(handle = handle.id(), ?kind, "Scheduled recurring job");
        self.tasks.insert(handle, task);
        handle
    }

    fn schedule_once(&mut self, delay: Duration, kind: WakeupKind) -> ScheduleHandle {
        let handle = self.next_handle();
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(Wakeup { handle, kind });
        });
        debug!(handle = handle.id(), ?kind, ?delay, "Scheduled one-shot job");
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: ScheduleHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
            debug!(handle = handle.id(), "Cancelled job");
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn recurring_ticks_arrive_each_second() {
        let (mut scheduler, mut rx) = TokioScheduler::new();
        let handle = scheduler.schedule_recurring(Duration::from_secs(1), WakeupKind::Tick);

        let start = Instant::now();
        for _ in 0..3 {
            let wakeup = rx.recv().await.unwrap();
            assert_eq!(wakeup.handle, handle);
            assert_eq!(wakeup.kind, WakeupKind::Tick);
        }
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn one_shot_fires_after_delay() {
        let (mut scheduler, mut rx) = TokioScheduler::new();
        let handle = scheduler.schedule_once(Duration::from_millis(500), WakeupKind::AutoStart);

        let start = Instant::now();
        let wakeup = rx.recv().await.unwrap();
        assert_eq!(wakeup.handle, handle);
        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_job_stops_sending() {
        let (mut scheduler, mut rx) = TokioScheduler::new();
        let cancelled = scheduler.schedule_once(Duration::from_millis(200), WakeupKind::AutoStart);
        let kept = scheduler.schedule_once(Duration::from_millis(400), WakeupKind::AutoStart);
        scheduler.cancel(cancelled);

        let wakeup = rx.recv().await.unwrap();
        assert_eq!(wakeup.handle, kept);
    }
}
