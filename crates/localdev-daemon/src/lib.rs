//! `localdev` Daemon
//!
//! Keeps a local working directory mirrored with a cloud IDE project:
//! - git capability layer over the `git` CLI
//! - two-branch sync engine (commit on *working*, reconcile via *master*)
//! - activity tracking and the idle-timeout scheduler
//! - first-run bootstrap

pub mod activity;
pub mod bootstrap;
pub mod git;
pub mod scheduler;
pub mod sync;

pub use git::{GitClient, GitError, GitStatus, Vcs};
pub use scheduler::{Scheduler, SchedulerHandle, StopReason};
pub use sync::{CycleOutcome, SyncEngine};
