//! First-run installation.
//!
//! Turns a fresh directory into the two-branch repository the sync engine
//! requires: clone the remote mainline, branch off *working*, seed the
//! ignore rules (the platform keeps its own `.gitignore` remotely), and
//! push the working branch once. Runs at most once per directory and is
//! not part of the recurring cycle.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use localdev_core::Config;

use crate::git::{GitError, MAINLINE, REMOTE, Vcs, WORKING};

const GITIGNORE_SEED: &str = include_str!("../assets/gitignore-base");

/// Errors from the first-run install.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Set up a local copy of the remote project in `dir`.
///
/// `now` is the epoch second embedded in the initial commit message.
pub async fn install<V: Vcs>(
    vcs: &V,
    dir: &Path,
    config: &Config,
    now: i64,
) -> Result<(), BootstrapError> {
    info!(remote = %config.remote_url, "bootstrapping repository");

    vcs.init().await?;
    vcs.add_remote(REMOTE, &config.authenticated_remote()).await?;
    vcs.pull(REMOTE, MAINLINE).await?;
    vcs.checkout(MAINLINE).await?;
    vcs.checkout_new_branch(WORKING).await?;

    tokio::fs::write(dir.join(".gitignore"), GITIGNORE_SEED).await?;

    // 0 means the user declined editor autosave seeding.
    if config.autosave_millis > 0 {
        let settings = serde_json::json!({
            "files.autoSave": "afterDelay",
            "files.autoSaveDelay": config.autosave_millis,
        });
        let vscode = dir.join(".vscode");
        tokio::fs::create_dir_all(&vscode).await?;
        tokio::fs::write(
            vscode.join("settings.json"),
            serde_json::to_string_pretty(&settings)?,
        )
        .await?;
    }

    vcs.add_all().await?;
    vcs.commit(&format!("localdev-init-{now}")).await?;
    vcs.push(REMOTE, WORKING).await?;

    info!("bootstrap complete, '{WORKING}' pushed to '{REMOTE}'");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::ScriptedVcs;

    fn test_config(autosave_millis: u64) -> Config {
        Config {
            remote_url: "https://api.glitch.com/curly-fern/git".into(),
            user_id: "48970c11-a9bd-cc3e-2188-ef34cbd44f31".into(),
            interval_secs: 15,
            idle_timeout_secs: 1800,
            autosave_millis,
            last_update: 0,
        }
    }

    #[tokio::test]
    async fn install_runs_setup_sequence_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let vcs = ScriptedVcs::new();

        install(&vcs, dir.path(), &test_config(0), 7).await.expect("install");

        assert_eq!(
            vcs.calls(),
            vec![
                "init",
                "add_remote origin https://48970c11-a9bd-cc3e-2188-ef34cbd44f31@api.glitch.com/curly-fern/git",
                "pull origin master",
                "checkout master",
                "checkout -b working",
                "add_all",
                "commit localdev-init-7",
                "push origin working",
            ]
        );
        assert_eq!(vcs.current_branch(), WORKING);
    }

    #[tokio::test]
    async fn install_seeds_gitignore() {
        let dir = tempfile::tempdir().expect("tempdir");
        let vcs = ScriptedVcs::new();

        install(&vcs, dir.path(), &test_config(0), 0).await.expect("install");

        let seeded = std::fs::read_to_string(dir.path().join(".gitignore")).expect("gitignore");
        assert!(seeded.contains(".localdev.json"));
        assert!(seeded.contains("node_modules/"));
        assert!(!dir.path().join(".vscode").exists());
    }

    #[tokio::test]
    async fn install_writes_autosave_settings_when_enabled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let vcs = ScriptedVcs::new();

        install(&vcs, dir.path(), &test_config(750), 0).await.expect("install");

        let raw = std::fs::read_to_string(dir.path().join(".vscode/settings.json"))
            .expect("settings.json");
        let settings: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(settings["files.autoSave"], "afterDelay");
        assert_eq!(settings["files.autoSaveDelay"], 750);
    }

    #[tokio::test]
    async fn failed_pull_aborts_before_any_file_writes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let vcs = ScriptedVcs::new();
        vcs.fail_on("pull");

        let err = install(&vcs, dir.path(), &test_config(0), 0)
            .await
            .expect_err("pull fails");

        assert!(matches!(err, BootstrapError::Git(_)));
        assert!(!dir.path().join(".gitignore").exists());
    }
}
