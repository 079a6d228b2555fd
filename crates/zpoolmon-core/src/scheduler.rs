//! Decides when to fetch, and makes sure only one fetch runs at a time.
//!
//! The scheduler is owned by the UI loop and is never shared. Fetches run on
//! a spawned tokio task and their results come back over a channel, so the
//! caller stays responsive while `zpool` runs. A trigger that arrives while a
//! fetch is in flight is remembered (once) and replayed as soon as that fetch
//! finishes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::RefreshConfig;
use crate::fetcher::{collect_snapshot, FetchError, StatusFetcher};
use crate::snapshot::PoolSnapshot;

pub type FetchOutcome = Result<PoolSnapshot, FetchError>;

/// User-adjustable refresh period, kept inside `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPeriod {
    current: Duration,
    min: Duration,
    max: Duration,
    step: Duration,
}

impl RefreshPeriod {
    pub fn from_config(config: &RefreshConfig) -> Self {
        Self {
            current: config.initial_period(),
            min: config.period_min,
            max: config.period_max,
            step: config.period_step,
        }
    }

    pub fn get(&self) -> Duration {
        self.current
    }

    pub fn as_secs(&self) -> u64 {
        self.current.as_secs()
    }

    /// Returns `false` when already at the upper bound.
    pub fn increase(&mut self) -> bool {
        self.set((self.current + self.step).min(self.max))
    }

    /// Returns `false` when already at the lower bound.
    pub fn decrease(&mut self) -> bool {
        self.set(self.current.saturating_sub(self.step).max(self.min))
    }

    fn set(&mut self, next: Duration) -> bool {
        let changed = next != self.current;
        self.current = next;
        changed
    }
}

/// One armed timer. Changing the period replaces it wholesale, so an old
/// deadline can never fire after a new one was installed.
#[derive(Debug, Clone, Copy)]
struct RefreshTimer {
    period: Duration,
    next_due: Instant,
}

impl RefreshTimer {
    fn install(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_due: now + period,
        }
    }

    fn fire(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.period;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Fetching,
    ShutDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Timer,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A fetch was spawned.
    Started,
    /// A fetch is already running; one more will follow it.
    Deferred,
    /// The scheduler has been shut down.
    Rejected,
}

pub struct RefreshScheduler<F: StatusFetcher + ?Sized> {
    fetcher: Arc<F>,
    pools: Arc<[String]>,
    period: RefreshPeriod,
    timer: Option<RefreshTimer>,
    state: SchedulerState,
    pending: bool,
    worker: Option<AbortHandle>,
    results_tx: UnboundedSender<FetchOutcome>,
    results_rx: UnboundedReceiver<FetchOutcome>,
}

impl<F: StatusFetcher + ?Sized + 'static> RefreshScheduler<F> {
    /// `pools` empty means every pool on the system.
    pub fn new(fetcher: Arc<F>, pools: Vec<String>, config: &RefreshConfig) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            fetcher,
            pools: pools.into(),
            period: RefreshPeriod::from_config(config),
            timer: None,
            state: SchedulerState::Idle,
            pending: false,
            worker: None,
            results_tx,
            results_rx,
        }
    }

    /// Arm the timer and kick off the first fetch.
    pub fn start(&mut self) -> TriggerOutcome {
        if self.state == SchedulerState::ShutDown {
            return TriggerOutcome::Rejected;
        }
        self.timer = Some(RefreshTimer::install(self.period.get(), Instant::now()));
        info!(period_secs = self.period.as_secs(), pools = ?self.pools, "refresh scheduler started");
        self.trigger(Trigger::Manual)
    }

    pub fn trigger(&mut self, trigger: Trigger) -> TriggerOutcome {
        match self.state {
            SchedulerState::ShutDown => TriggerOutcome::Rejected,
            SchedulerState::Fetching => {
                if !self.pending {
                    debug!(?trigger, "fetch in flight, deferring trigger");
                }
                self.pending = true;
                TriggerOutcome::Deferred
            }
            SchedulerState::Idle => {
                debug!(?trigger, "starting fetch");
                self.spawn_fetch();
                TriggerOutcome::Started
            }
        }
    }

    /// Non-blocking step for the UI loop: collect a finished fetch if there is
    /// one, then fire the timer if it is due.
    pub fn poll(&mut self) -> Option<FetchOutcome> {
        if self.state == SchedulerState::ShutDown {
            return None;
        }

        let finished = match self.results_rx.try_recv() {
            Ok(outcome) => Some(self.finish(outcome)),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        };

        let now = Instant::now();
        if self.timer.as_mut().is_some_and(|timer| timer.fire(now)) {
            self.trigger(Trigger::Timer);
        }

        finished
    }

    /// Wait for the in-flight fetch to finish. `None` when nothing is running
    /// or the scheduler was shut down.
    #[cfg(test)]
    pub(crate) async fn completed(&mut self) -> Option<FetchOutcome> {
        if self.state != SchedulerState::Fetching {
            return None;
        }
        let outcome = self.results_rx.recv().await?;
        Some(self.finish(outcome))
    }

    pub fn increase_period(&mut self) -> Duration {
        if self.period.increase() {
            self.reinstall_timer();
        }
        self.period.get()
    }

    pub fn decrease_period(&mut self) -> Duration {
        if self.period.decrease() {
            self.reinstall_timer();
        }
        self.period.get()
    }

    pub fn period(&self) -> Duration {
        self.period.get()
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_fetching(&self) -> bool {
        self.state == SchedulerState::Fetching
    }

    #[cfg(test)]
    pub(crate) fn has_pending(&self) -> bool {
        self.pending
    }

    /// Drop the timer and abandon any running fetch. A fetch that completes
    /// afterwards has nowhere to deliver its result.
    pub fn shutdown(&mut self) {
        if self.state == SchedulerState::ShutDown {
            return;
        }
        self.state = SchedulerState::ShutDown;
        self.timer = None;
        self.pending = false;
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
        self.results_rx.close();
        info!("refresh scheduler shut down");
    }

    fn spawn_fetch(&mut self) {
        let fetcher = Arc::clone(&self.fetcher);
        let pools = Arc::clone(&self.pools);
        let results = self.results_tx.clone();

        self.state = SchedulerState::Fetching;
        let fetch = tokio::spawn(async move { collect_snapshot(fetcher.as_ref(), &pools).await });
        self.worker = Some(fetch.abort_handle());

        // A panicking fetch still reports back, so the scheduler leaves `Fetching`.
        tokio::spawn(async move {
            let outcome = match fetch.await {
                Ok(outcome) => outcome,
                Err(err) if err.is_cancelled() => return,
                Err(err) => Err(FetchError::Worker(err.to_string())),
            };
            // The receiver is gone only after shutdown.
            let _ = results.send(outcome);
        });
    }

    fn finish(&mut self, outcome: FetchOutcome) -> FetchOutcome {
        self.worker = None;
        self.state = SchedulerState::Idle;

        match &outcome {
            Ok(snapshot) => debug!(pools = snapshot.len(), "fetch finished"),
            Err(err) => warn!(error = %err, "fetch failed"),
        }

        if std::mem::take(&mut self.pending) {
            debug!("replaying deferred trigger");
            self.spawn_fetch();
        }
        outcome
    }

    fn reinstall_timer(&mut self) {
        let period = self.period.get();
        info!(period_secs = period.as_secs(), "refresh period changed");
        // Not started yet, or already shut down: nothing to re-arm.
        if self.timer.is_some() {
            self.timer = Some(RefreshTimer::install(period, Instant::now()));
        }
    }
}

impl<F: StatusFetcher + ?Sized> Drop for RefreshScheduler<F> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}
