//! Two-branch sync engine.
//!
//! One cycle: detect dirt, commit it on *working*, fold it into *master*
//! (after fast-forwarding *master* from the remote), fold *master* back
//! into *working*, push *working*. The commit-before-merge order protects
//! uncommitted edits across branch switches, and the final master→working
//! merge keeps the next cycle's dirty check diffing against an
//! already-reconciled tree.
//!
//! The engine never pushes *master* and never retries: any failing step
//! aborts the cycle and the error surfaces to the scheduler.

use tracing::{debug, info};

use crate::git::{GitError, MAINLINE, REMOTE, Vcs, WORKING};

/// Outcome of a completed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No changes; nothing was touched.
    Clean,
    /// Changes were committed, reconciled, and pushed.
    Dirty,
}

/// Drives the detect → commit → reconcile → push sequence.
pub struct SyncEngine<V> {
    vcs: V,
}

impl<V: Vcs> SyncEngine<V> {
    pub const fn new(vcs: V) -> Self {
        Self { vcs }
    }

    pub const fn vcs(&self) -> &V {
        &self.vcs
    }

    /// Run one sync cycle.
    ///
    /// `now` is the wall-clock epoch second embedded in the commit
    /// message; the scheduler takes it once per tick so the commit id,
    /// the activity mark, and the idle computation all observe the same
    /// instant.
    pub async fn run_cycle(&self, now: i64) -> Result<CycleOutcome, GitError> {
        let status = self.vcs.status().await?;
        if !status.is_dirty() {
            debug!("working tree clean");
            return Ok(CycleOutcome::Clean);
        }

        info!(
            untracked = status.untracked.len(),
            deleted = status.deleted.len(),
            modified = status.modified.len(),
            "changes detected"
        );
        debug!(
            untracked = ?status.untracked,
            deleted = ?status.deleted,
            modified = ?status.modified,
            "dirty paths"
        );

        self.vcs.add_all().await?;
        self.vcs.commit(&format!("localdev-{now}")).await?;

        // Publish direction: fast-forward master from the remote, then
        // fold the fresh working commit in.
        self.vcs.checkout(MAINLINE).await?;
        self.vcs.pull(REMOTE, MAINLINE).await?;
        self.vcs.merge(WORKING).await?;

        // Reconcile direction: anything the pull brought in flows back
        // into the branch being edited.
        self.vcs.checkout(WORKING).await?;
        self.vcs.merge(MAINLINE).await?;

        self.vcs.push(REMOTE, WORKING).await?;
        info!("pushed updates to {WORKING}");

        Ok(CycleOutcome::Dirty)
    }
}
