//! The long-running watch loop.
//!
//! # States
//!
//! ```text
//!           ┌──────────────────────────────────────────────┐
//!           ▼                                              │
//!   WaitingForEvent ──first signal──► Draining ──► Dispatching ──► Rearm
//!      │      │                          │
//!      │      └─ source closed ──► SourceClosed
//!      └─ cancelled (any wait) ──► Cancelled
//! ```
//!
//! Draining collects every signal that arrives within the debounce window
//! after the first one. Dispatches run one at a time on the blocking pool.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sg_core::{OverflowPolicy, WatchConfig};
use sg_watcher::{ChangeBatch, EventBatchStats, WatchError, WatchSignal, WatchSource};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::builder::SiteBuilder;
use crate::router::{ChangeRouter, Dispatch};

/// Why [`WatchLoop::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopOutcome {
    /// The cancellation token fired.
    Cancelled,
    /// The watch source stopped producing signals.
    SourceClosed,
}

/// Counters accumulated over one run of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopStats {
    /// Batches processed.
    pub batches: usize,
    /// Dispatches that completed successfully.
    pub dispatches: usize,
    /// Dispatches that failed.
    pub failures: usize,
    /// Overflow markers received.
    pub overflows: usize,
    /// Roles whose watch was dropped.
    pub dropped_roles: usize,
}

impl fmt::Display for LoopStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} batches, {} dispatches, {} failed, {} overflows, {} roles dropped",
            self.batches, self.dispatches, self.failures, self.overflows, self.dropped_roles
        )
    }
}

/// Waits for change batches and dispatches rebuilds until cancelled.
pub struct WatchLoop<S> {
    source: S,
    builder: Arc<Mutex<SiteBuilder>>,
    router: ChangeRouter,
    debounce: Duration,
    stats: LoopStats,
}

impl<S> fmt::Debug for WatchLoop<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchLoop")
            .field("router", &self.router)
            .field("debounce", &self.debounce)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<S: WatchSource> WatchLoop<S> {
    /// Creates a loop over `source` that dispatches to `builder`.
    #[must_use]
    pub fn new(source: S, builder: Arc<Mutex<SiteBuilder>>, config: &WatchConfig) -> Self {
        Self {
            source,
            builder,
            router: ChangeRouter::new(config.on_overflow),
            debounce: Duration::from_millis(config.debounce_ms),
            stats: LoopStats::default(),
        }
    }

    /// Runs until `cancel` fires or the source closes.
    ///
    /// A dispatch that has started always finishes; cancellation is only
    /// observed between dispatches and while waiting.
    pub async fn run(mut self, cancel: &CancellationToken) -> (LoopOutcome, LoopStats) {
        info!(
            roles = ?self.source.watched_roles().as_slice(),
            debounce_ms = self.debounce.as_millis(),
            "Watching for changes"
        );

        let outcome = loop {
            let first = tokio::select! {
                biased;
                () = cancel.cancelled() => break LoopOutcome::Cancelled,
                signal = self.source.events().recv() => match signal {
                    Some(signal) => signal,
                    None => break LoopOutcome::SourceClosed,
                },
            };

            let (batch, closed) = tokio::select! {
                biased;
                () = cancel.cancelled() => break LoopOutcome::Cancelled,
                drained = self.drain(first) => drained,
            };

            if let Some(outcome) = self.process(&batch, cancel).await {
                break outcome;
            }
            if closed {
                break LoopOutcome::SourceClosed;
            }
        };

        info!(outcome = ?outcome, stats = %self.stats, "Watch loop stopped");
        (outcome, self.stats)
    }

    /// Collects signals until the debounce window after `first` elapses.
    /// The flag is `true` if the source closed meanwhile.
    async fn drain(&mut self, first: WatchSignal) -> (ChangeBatch, bool) {
        let mut batch = ChangeBatch::new();
        batch.push(first);
        let deadline = Instant::now() + self.debounce;
        loop {
            match tokio::time::timeout_at(deadline, self.source.events().recv()).await {
                Ok(Some(signal)) => batch.push(signal),
                Ok(None) => return (batch, true),
                Err(_elapsed) => return (batch, false),
            }
        }
    }

    /// Dispatches one batch and re-arms its roles. Returns an outcome if the
    /// loop must stop.
    async fn process(
        &mut self,
        batch: &ChangeBatch,
        cancel: &CancellationToken,
    ) -> Option<LoopOutcome> {
        self.stats.batches += 1;
        debug!(stats = ?EventBatchStats::from_batch(batch), "Processing batch");

        let overflows = batch.overflow_count();
        if overflows > 0 {
            self.stats.overflows += overflows;
            match self.router.on_overflow() {
                OverflowPolicy::Ignore => {
                    warn!(count = overflows, "Events were lost, some changes may be missed");
                }
                OverflowPolicy::FullResync => {
                    warn!(count = overflows, "Events were lost, resynchronizing everything");
                }
            }
        }

        for dispatch in self.router.route(batch) {
            if cancel.is_cancelled() {
                return Some(LoopOutcome::Cancelled);
            }
            self.dispatch(dispatch).await;
        }

        for role in batch.roles() {
            match self.source.rearm(role) {
                Ok(()) => {}
                Err(error @ WatchError::DirectoryGone { .. }) => {
                    self.stats.dropped_roles += 1;
                    warn!(role = %role, "{error}");
                }
                Err(error) => warn!(role = %role, error = %error, "Failed to re-arm watch"),
            }
        }

        None
    }

    async fn dispatch(&mut self, dispatch: Dispatch) {
        let builder = Arc::clone(&self.builder);
        let joined =
            tokio::task::spawn_blocking(move || builder.lock().execute(dispatch)).await;

        match joined {
            Ok(Ok(_report)) => {
                self.stats.dispatches += 1;
                debug!(dispatch = %dispatch, "Dispatch finished");
            }
            Ok(Err(error)) => {
                self.stats.failures += 1;
                error!(dispatch = %dispatch, error = %error, "Dispatch failed");
            }
            Err(join_error) => {
                self.stats.failures += 1;
                error!(dispatch = %dispatch, error = %join_error, "Dispatch task did not complete");
            }
        }
    }
}
