//! `localdev`
//!
//! Mirrors a cloud IDE project into a local working directory: first run
//! collects the configuration and bootstraps the two-branch repository,
//! then the daemon syncs on a fixed cadence until the idle timeout fires
//! or ctrl-c arrives.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use localdev_core::config::epoch_secs;
use localdev_core::{CONFIG_FILE, Config};
use localdev_daemon::bootstrap;
use localdev_daemon::git::GitClient;
use localdev_daemon::scheduler::Scheduler;
use localdev_daemon::sync::SyncEngine;
use localdev_setup::{WizardOverrides, run_wizard};

#[derive(Parser, Debug)]
#[command(name = "localdev")]
#[command(version, about = "Edit a cloud IDE project locally, synced over git")]
struct Args {
    /// Working directory to mirror
    #[arg(long, default_value = ".", env = "LOCALDEV_DIR")]
    dir: PathBuf,

    /// Run without interactive prompts (first run then needs --remote-url
    /// and --user-id)
    #[arg(long)]
    non_interactive: bool,

    /// Remote git endpoint of the project (first run only)
    #[arg(long, env = "LOCALDEV_REMOTE_URL")]
    remote_url: Option<String>,

    /// Identity token for the platform's git endpoint (first run only)
    #[arg(long, env = "LOCALDEV_USER_ID")]
    user_id: Option<String>,

    /// Seconds between sync cycles, 5-900 (first run only)
    #[arg(long, env = "LOCALDEV_INTERVAL")]
    interval_secs: Option<u64>,

    /// Idle seconds before the daemon stops itself, 0 disables (first run
    /// only)
    #[arg(long, env = "LOCALDEV_IDLE_TIMEOUT")]
    idle_timeout_secs: Option<u64>,

    /// Editor autosave delay in milliseconds, 0 skips seeding (first run
    /// only)
    #[arg(long, env = "LOCALDEV_AUTOSAVE_MS")]
    autosave_millis: Option<u64>,

    /// Log level filter for the daemon (e.g. "info", "debug", "warn").
    #[arg(long, default_value = "info", env = "LOCALDEV_LOG_LEVEL")]
    log_level: String,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "LOCALDEV_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    localdev_core::tracing_init::init_tracing(&args.log_level, args.log_json);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        dir = %args.dir.display(),
        "starting localdev"
    );

    let config_path = args.dir.join(CONFIG_FILE);
    let config = if config_path.exists() {
        // A corrupt or invalid record is fatal before the first cycle;
        // the daemon never runs against unvalidated settings.
        Config::load(&config_path)
            .with_context(|| format!("loading {}", config_path.display()))?
    } else {
        let overrides = WizardOverrides {
            remote_url: args.remote_url.clone(),
            user_id: args.user_id.clone(),
            interval_secs: args.interval_secs,
            idle_timeout_secs: args.idle_timeout_secs,
            autosave_millis: args.autosave_millis,
        };
        let config = run_wizard(&config_path, &overrides, args.non_interactive)?;
        bootstrap::install(
            &GitClient::new(args.dir.clone()),
            &args.dir,
            &config,
            epoch_secs(),
        )
        .await
        .context("first-run bootstrap failed")?;
        config
    };

    let engine = SyncEngine::new(GitClient::new(args.dir.clone()));
    let mut handle = Scheduler::new(engine, config, config_path).start();

    tokio::select! {
        reason = handle.wait() => {
            info!(?reason, "daemon stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("ctrl-c received, shutting down");
            handle.stop();
            let reason = handle.wait().await;
            info!(?reason, "daemon stopped");
        }
    }

    Ok(())
}
