//! Recurring timers
//!
//! `register_interval` runs a callback on a fixed period until the returned
//! handle is cancelled or dropped. Callbacks close over stable handles
//! (channel senders) rather than over the state they affect.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Cancels its interval on `cancel()` or drop
#[derive(Debug)]
pub struct IntervalHandle {
    task: JoinHandle<()>,
}

impl IntervalHandle {
    pub(crate) fn from_task(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// Stop the interval
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Call `f` every `period`, first after one period has elapsed
///
/// Must be called from within a tokio runtime.
pub fn register_interval<F>(period: Duration, mut f: F) -> IntervalHandle
where
    F: FnMut() + Send + 'static,
{
    let task = tokio::spawn(async move {
        let start = tokio::time::Instant::now() + period;
        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            f();
        }
    });

    IntervalHandle::from_task(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn fires_every_period() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let _handle = register_interval(Duration::from_millis(250), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(1010)).await;
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_callbacks() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let handle = register_interval(Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(250)).await;
        handle.cancel();
        let fired = count.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), fired);
        assert!(handle.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_callbacks() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let handle = register_interval(Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(handle);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
