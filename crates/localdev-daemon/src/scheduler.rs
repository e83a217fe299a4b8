//! Timeout-governed scheduler.
//!
//! Fires the sync engine on a fixed cadence and stops itself once no
//! changes have been seen for the configured idle period. The tick loop
//! is a single task: a cycle's blocking I/O runs to completion before the
//! next tick is considered, and `MissedTickBehavior::Skip` drops ticks
//! that elapse while a slow cycle (a long push, say) is still in flight.
//! At most one cycle ever runs at a time.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use localdev_core::Config;
use localdev_core::config::epoch_secs;

use crate::activity::ActivityTracker;
use crate::git::{GitClient, GitError, Vcs};
use crate::sync::{CycleOutcome, SyncEngine};

/// Why the scheduler stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No changes for longer than the configured idle timeout.
    IdleTimeout,
    /// External shutdown via [`SchedulerHandle::stop`].
    Shutdown,
}

/// Owns the recurring cycle task.
///
/// Exactly one instance exists per daemon. The configuration is passed in
/// at construction; there is no process-wide state.
pub struct Scheduler<V> {
    engine: SyncEngine<V>,
    tracker: ActivityTracker,
    config: Config,
    config_path: PathBuf,
    /// Wall-clock epoch at loop start; per-tick timestamps are derived
    /// from this plus the monotonic elapsed time, so they never go
    /// backwards.
    base_epoch: i64,
}

impl<V: Vcs> Scheduler<V> {
    pub fn new(engine: SyncEngine<V>, config: Config, config_path: PathBuf) -> Self {
        let tracker = ActivityTracker::new(config.last_update);
        Self {
            engine,
            tracker,
            config,
            config_path,
            base_epoch: epoch_secs(),
        }
    }

    async fn run_loop(mut self, mut stop_rx: watch::Receiver<bool>) -> StopReason {
        let started = tokio::time::Instant::now();
        let mut timer = tokio::time::interval(Duration::from_secs(self.config.interval_secs));
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval_secs = self.config.interval_secs,
            idle_timeout_secs = self.config.idle_timeout_secs,
            "sync cadence started"
        );

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    let now = self.base_epoch
                        + i64::try_from(started.elapsed().as_secs()).unwrap_or(0);
                    if let Some(reason) = self.tick(now).await {
                        return reason;
                    }
                }
                // Only observed between cycles; an in-flight cycle always
                // finishes on a safe branch before shutdown.
                _ = stop_rx.changed() => {
                    info!("shutdown requested, stopping cycles");
                    return StopReason::Shutdown;
                }
            }
        }
    }

    /// One tick: run a cycle, account for activity, check the idle
    /// timeout. A cycle error never stops the cadence.
    async fn tick(&mut self, now: i64) -> Option<StopReason> {
        match self.engine.run_cycle(now).await {
            Ok(CycleOutcome::Dirty) => {
                self.tracker.mark_active(now);
                self.config.touch(now);
                if let Err(e) = self.config.store(&self.config_path) {
                    warn!(error = %e, "failed to persist last_update");
                }
            }
            Ok(CycleOutcome::Clean) => {}
            Err(e @ GitError::MergeConflict { .. }) => {
                error!(
                    error = %e,
                    "merge conflict aborted the cycle; if this repeats the \
                     repository needs manual repair"
                );
            }
            Err(e) => {
                warn!(error = %e, "sync cycle failed, retrying next tick");
            }
        }

        let idle_timeout = self.config.idle_timeout_secs;
        if idle_timeout > 0 {
            let idle = self.tracker.idle_seconds(now);
            if idle > idle_timeout {
                info!(idle_secs = idle, idle_timeout_secs = idle_timeout, "idle timeout reached");
                return Some(StopReason::IdleTimeout);
            }
        }
        None
    }
}

impl Scheduler<GitClient> {
    /// Spawn the recurring cycle task and hand back its control handle.
    pub fn start(self) -> SchedulerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let join = tokio::spawn(self.run_loop(stop_rx));
        SchedulerHandle { stop_tx, join }
    }
}

/// Cancellable handle to the running scheduler.
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<StopReason>,
}

impl SchedulerHandle {
    /// Request shutdown. Does not interrupt a cycle already in flight.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Wait for the scheduler to stop. Cancel-safe.
    pub async fn wait(&mut self) -> StopReason {
        (&mut self.join).await.unwrap_or_else(|e| {
            warn!(error = %e, "scheduler task failed");
            StopReason::Shutdown
        })
    }
}
