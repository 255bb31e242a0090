//! Periodic refresh with an in-flight guard and stale-result discarding.
//!
//! A cycle is skipped outright if the previous one is still running, and the
//! next tick is only scheduled once the current cycle has finished. Anything
//! that supersedes a cycle while it is fetching (a stop signal, a manual
//! refresh, a view change) bumps the epoch so its result is dropped on arrival.

use std::{
    future::Future,
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
    time::Duration,
};

use tokio::sync::watch;
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub struct RefreshGuard {
    in_flight: AtomicBool,
    epoch: AtomicU64,
}

/// Held for the duration of one refresh cycle. Releases the guard on drop.
#[derive(Debug)]
pub struct RefreshTicket<'a> {
    guard: &'a RefreshGuard,
    epoch: u64,
}

impl RefreshTicket<'_> {
    /// False once the cycle has been superseded; its result must not be committed.
    pub fn is_current(&self) -> bool {
        self.guard.epoch.load(Ordering::SeqCst) == self.epoch
    }
}

impl Drop for RefreshTicket<'_> {
    fn drop(&mut self) {
        self.guard.in_flight.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RefreshOutcome<T> {
    Committed(T),
    /// Another cycle was already in flight.
    Skipped,
    /// The cycle finished after being superseded.
    Discarded,
}

impl RefreshGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Option<RefreshTicket<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;

        Some(RefreshTicket {
            guard: self,
            epoch: self.epoch.load(Ordering::SeqCst),
        })
    }

    pub fn supersede(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub async fn try_refresh<T, F, Fut>(&self, fetch: F) -> RefreshOutcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let Some(ticket) = self.begin() else {
            trace!("refresh already in flight, skipping");
            return RefreshOutcome::Skipped;
        };

        let value = fetch().await;

        if ticket.is_current() {
            RefreshOutcome::Committed(value)
        } else {
            debug!("refresh superseded, discarding result");
            RefreshOutcome::Discarded
        }
    }
}

/// Timer-chained poller: fetch, commit, sleep `cadence`, repeat until `stop` flips to true
/// or its sender is dropped.
pub struct Refresher {
    guard: RefreshGuard,
    cadence: Duration,
}

impl Refresher {
    pub fn new(cadence: Duration) -> Self {
        Self {
            guard: RefreshGuard::new(),
            cadence,
        }
    }

    pub async fn run<T, F, Fut, C>(&self, mut fetch: F, mut commit: C, mut stop: watch::Receiver<bool>)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = T>,
        C: FnMut(T),
    {
        loop {
            if *stop.borrow() {
                break;
            }

            let cycle = self.guard.try_refresh(&mut fetch);
            let outcome = tokio::select! {
                outcome = cycle => outcome,
                _ = stop_requested(&mut stop) => {
                    self.guard.supersede();
                    break;
                }
            };

            if let RefreshOutcome::Committed(value) = outcome {
                commit(value);
            }

            tokio::select! {
                _ = tokio::time::sleep(self.cadence) => {}
                _ = stop_requested(&mut stop) => break,
            }
        }

        debug!("refresh loop stopped");
    }
}

/// Resolves once `stop` holds true or its sender is gone. Other updates are ignored.
async fn stop_requested(stop: &mut watch::Receiver<bool>) {
    let _ = stop.wait_for(|stopped| *stopped).await;
}
