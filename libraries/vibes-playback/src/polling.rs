//! Scheduled polling data source
//!
//! Fetches a value immediately and then on every interval, publishing the
//! latest result on a watch channel. A failed fetch keeps the last good
//! value around as `stale` and polling simply continues.

use crate::error::Result;
use crate::scheduler::IntervalHandle;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Latest state of a polled value
#[derive(Debug, Clone, PartialEq)]
pub enum PollState<T> {
    /// No fetch has completed yet
    Loading,
    /// The last fetch succeeded
    Ready(T),
    /// The last fetch failed
    Failed {
        error: String,
        /// Last good value, if there ever was one
        stale: Option<T>,
    },
}

impl<T> PollState<T> {
    /// Newest good value, fresh or stale
    pub fn latest(&self) -> Option<&T> {
        match self {
            PollState::Loading => None,
            PollState::Ready(value) => Some(value),
            PollState::Failed { stale, .. } => stale.as_ref(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PollState::Loading)
    }
}

/// A value refreshed every `interval`
pub struct PollingSource<T> {
    state: watch::Receiver<PollState<T>>,
    handle: IntervalHandle,
}

impl<T> PollingSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start polling `fetch` right away, then every `interval`
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(name: &'static str, interval: Duration, mut fetch: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(PollState::Loading);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;

                let next = match fetch().await {
                    Ok(value) => {
                        debug!(source = name, "Poll succeeded");
                        PollState::Ready(value)
                    }
                    Err(e) => {
                        warn!(source = name, error = %e, "Poll failed");
                        let stale = tx.borrow().latest().cloned();
                        PollState::Failed {
                            error: e.to_string(),
                            stale,
                        }
                    }
                };

                if tx.send(next).is_err() {
                    debug!(source = name, "No subscribers left, stopping poll");
                    break;
                }
            }
        });

        Self {
            state: rx,
            handle: IntervalHandle::from_task(task),
        }
    }

    /// Current state
    pub fn state(&self) -> PollState<T> {
        self.state.borrow().clone()
    }

    /// Newest good value
    pub fn latest(&self) -> Option<T> {
        self.state.borrow().latest().cloned()
    }

    /// Receiver notified on every completed fetch
    pub fn subscribe(&self) -> watch::Receiver<PollState<T>> {
        self.state.clone()
    }

    /// Stop polling
    pub fn stop(&self) {
        self.handle.cancel();
    }
}
