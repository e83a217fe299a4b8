//! Git capability layer.
//!
//! Shells out to the `git` CLI via `tokio::process::Command`. The daemon
//! only ever needs a handful of primitives (status, add, commit, checkout,
//! merge, pull, push), exposed behind the [`Vcs`] trait so the sync engine
//! and bootstrap can be exercised against a scripted double.

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

/// Branch that mirrors the remote's canonical reviewed branch. Never
/// pushed by this daemon; only fast-forwarded from the remote.
pub const MAINLINE: &str = "master";
/// Branch the daemon commits to and pushes on every dirty cycle.
pub const WORKING: &str = "working";
/// The single configured remote.
pub const REMOTE: &str = "origin";

/// Errors from git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// A git invocation exited non-zero. Opaque to callers; typically a
    /// network failure, a lock, or a rejected push.
    #[error("git {op} failed: {stderr}")]
    Command { op: &'static str, stderr: String },

    /// A merge exited non-zero and left conflict markers behind. The
    /// repository needs manual repair before the next cycle can succeed.
    #[error("merge of '{branch}' conflicted: {stderr}")]
    MergeConflict { branch: String, stderr: String },

    /// I/O error spawning git itself.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a status query: three disjoint path lists, recomputed every
/// cycle and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitStatus {
    pub untracked: Vec<String>,
    pub deleted: Vec<String>,
    pub modified: Vec<String>,
}

impl GitStatus {
    /// A snapshot is dirty iff at least one list is non-empty.
    pub fn is_dirty(&self) -> bool {
        !self.untracked.is_empty() || !self.deleted.is_empty() || !self.modified.is_empty()
    }
}

/// Version-control primitives the daemon consumes.
#[allow(async_fn_in_trait)]
pub trait Vcs {
    async fn init(&self) -> Result<(), GitError>;
    async fn add_remote(&self, name: &str, url: &str) -> Result<(), GitError>;
    async fn checkout(&self, branch: &str) -> Result<(), GitError>;
    async fn checkout_new_branch(&self, branch: &str) -> Result<(), GitError>;
    /// Fast-forward only: the local mainline must never diverge.
    async fn pull(&self, remote: &str, branch: &str) -> Result<(), GitError>;
    async fn status(&self) -> Result<GitStatus, GitError>;
    async fn add_all(&self) -> Result<(), GitError>;
    async fn commit(&self, message: &str) -> Result<(), GitError>;
    /// Merge `from` into the currently checked-out branch.
    async fn merge(&self, from: &str) -> Result<(), GitError>;
    async fn push(&self, remote: &str, branch: &str) -> Result<(), GitError>;
}

/// [`Vcs`] implementation backed by the `git` binary.
#[derive(Debug, Clone)]
pub struct GitClient {
    dir: PathBuf,
}

impl GitClient {
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    async fn run(&self, op: &'static str, args: &[&str]) -> Result<String, GitError> {
        debug!(op, ?args, "running git");
        let output = tokio::process::Command::new("git")
            .args(args)
            .current_dir(&self.dir)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(op, status = %output.status, stderr = %stderr, "git failed");
            return Err(GitError::Command { op, stderr });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Vcs for GitClient {
    async fn init(&self) -> Result<(), GitError> {
        self.run("init", &["init"]).await.map(drop)
    }

    async fn add_remote(&self, name: &str, url: &str) -> Result<(), GitError> {
        self.run("remote add", &["remote", "add", name, url])
            .await
            .map(drop)
    }

    async fn checkout(&self, branch: &str) -> Result<(), GitError> {
        self.run("checkout", &["checkout", branch]).await.map(drop)
    }

    async fn checkout_new_branch(&self, branch: &str) -> Result<(), GitError> {
        self.run("checkout -b", &["checkout", "-b", branch])
            .await
            .map(drop)
    }

    async fn pull(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        self.run("pull", &["pull", "--ff-only", remote, branch])
            .await
            .map(drop)
    }

    async fn status(&self) -> Result<GitStatus, GitError> {
        let out = self.run("status", &["status", "--porcelain"]).await?;
        Ok(parse_porcelain(&out))
    }

    async fn add_all(&self) -> Result<(), GitError> {
        self.run("add", &["add", "--all"]).await.map(drop)
    }

    async fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run("commit", &["commit", "-m", message]).await.map(drop)
    }

    async fn merge(&self, from: &str) -> Result<(), GitError> {
        match self.run("merge", &["merge", from]).await {
            Ok(_) => Ok(()),
            Err(GitError::Command { stderr, .. }) => {
                // `git merge` reports conflicts on stdout, but exits
                // non-zero either way; stderr is empty for a clean
                // conflict, so re-check the tree to tell them apart.
                let conflicted = stderr.contains("CONFLICT")
                    || stderr.contains("Automatic merge failed")
                    || self.has_unmerged_paths().await?;
                if conflicted {
                    Err(GitError::MergeConflict {
                        branch: from.to_string(),
                        stderr,
                    })
                } else {
                    Err(GitError::Command { op: "merge", stderr })
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        self.run("push", &["push", remote, branch]).await.map(drop)
    }
}

impl GitClient {
    async fn has_unmerged_paths(&self) -> Result<bool, GitError> {
        let out = self
            .run("diff", &["diff", "--name-only", "--diff-filter=U"])
            .await?;
        Ok(!out.trim().is_empty())
    }
}

/// Parse `git status --porcelain` output into the three path lists.
///
/// Lines are `XY path` (or `XY old -> new` for renames, where only the new
/// name matters to the dirty check).
fn parse_porcelain(out: &str) -> GitStatus {
    let mut status = GitStatus::default();
    for line in out.lines() {
        if line.len() < 4 {
            continue;
        }
        let (code, rest) = line.split_at(2);
        let path = rest
            .trim_start()
            .rsplit(" -> ")
            .next()
            .unwrap_or(rest)
            .to_string();

        if code == "??" {
            status.untracked.push(path);
        } else if code.contains('D') {
            status.deleted.push(path);
        } else {
            status.modified.push(path);
        }
    }
    status
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn porcelain_empty_is_clean() {
        let status = parse_porcelain("");
        assert!(!status.is_dirty());
        assert!(status.untracked.is_empty());
        assert!(status.deleted.is_empty());
        assert!(status.modified.is_empty());
    }

    #[test]
    fn porcelain_untracked() {
        let status = parse_porcelain("?? server.js\n?? assets/logo.png\n");
        assert_eq!(status.untracked, vec!["server.js", "assets/logo.png"]);
        assert!(status.is_dirty());
    }

    #[test]
    fn porcelain_deleted_in_either_column() {
        let status = parse_porcelain(" D gone.js\nD  also-gone.js\n");
        assert_eq!(status.deleted, vec!["gone.js", "also-gone.js"]);
        assert!(status.modified.is_empty());
    }

    #[test]
    fn porcelain_modified_and_staged() {
        let status = parse_porcelain(" M app.js\nMM style.css\nA  new.js\n");
        assert_eq!(status.modified, vec!["app.js", "style.css", "new.js"]);
    }

    #[test]
    fn porcelain_rename_keeps_new_name() {
        let status = parse_porcelain("R  old.js -> new.js\n");
        assert_eq!(status.modified, vec!["new.js"]);
    }

    #[test]
    fn merge_conflict_is_a_leaf_error_naming_the_branch() {
        let err = GitError::MergeConflict {
            branch: WORKING.to_string(),
            stderr: "Automatic merge failed".to_string(),
        };
        // The branch name is plain context, not a wrapped error cause.
        assert!(std::error::Error::source(&err).is_none());
        assert_eq!(
            err.to_string(),
            "merge of 'working' conflicted: Automatic merge failed"
        );
    }

    #[test]
    fn porcelain_mixed() {
        let status = parse_porcelain("?? a.js\n M b.js\n D c.js\n");
        assert_eq!(status.untracked, vec!["a.js"]);
        assert_eq!(status.modified, vec!["b.js"]);
        assert_eq!(status.deleted, vec!["c.js"]);
    }
}
