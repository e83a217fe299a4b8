//! First-run configuration wizard.

use std::path::Path;

use anyhow::{Context, Result};

use localdev_core::Config;
use localdev_core::config::epoch_secs;

use crate::prompt;

/// Values supplied on the command line that skip their prompt.
#[derive(Debug, Default, Clone)]
pub struct WizardOverrides {
    pub remote_url: Option<String>,
    pub user_id: Option<String>,
    pub interval_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
    pub autosave_millis: Option<u64>,
}

/// Collect, validate, and persist the configuration record.
///
/// In non-interactive mode every prompt falls back to its override or
/// default; the two identity fields have no default and fail setup when
/// missing. The assembled record is validated as a whole before anything
/// is written, so an out-of-range override can never reach disk.
pub fn run_wizard(
    config_path: &Path,
    overrides: &WizardOverrides,
    non_interactive: bool,
) -> Result<Config> {
    // Step 1: where the project lives and who is pushing
    let remote_url = match &overrides.remote_url {
        Some(url) => url.clone(),
        None => prompt::prompt_remote_url(non_interactive)?,
    };
    let user_id = match &overrides.user_id {
        Some(id) => id.clone(),
        None => prompt::prompt_user_id(non_interactive)?,
    };

    // Step 2: cadence and shutdown behavior
    let interval_secs = match overrides.interval_secs {
        Some(secs) => secs,
        None => prompt::prompt_interval(non_interactive)?,
    };
    let idle_timeout_secs = match overrides.idle_timeout_secs {
        Some(secs) => secs,
        None => prompt::prompt_idle_timeout(non_interactive)?,
    };

    // Step 3: optional editor autosave seeding
    let autosave_millis = match overrides.autosave_millis {
        Some(millis) => millis,
        None => prompt::prompt_autosave(non_interactive)?,
    };

    let config = Config {
        remote_url,
        user_id,
        interval_secs,
        idle_timeout_secs,
        autosave_millis,
        last_update: epoch_secs(),
    };
    config
        .validate()
        .context("collected configuration is invalid")?;
    config
        .store(config_path)
        .with_context(|| format!("writing {}", config_path.display()))?;

    tracing::info!(path = %config_path.display(), "configuration written");

    #[allow(clippy::print_stdout)]
    {
        println!();
        println!("Setup complete!");
        println!();
        println!("  Project:  {}", config.remote_url);
        println!("  Interval: every {} seconds", config.interval_secs);
        if config.idle_timeout_secs == 0 {
            println!("  Timeout:  disabled (runs until stopped)");
        } else {
            println!("  Timeout:  after {} idle seconds", config.idle_timeout_secs);
        }
        println!();
    }

    Ok(config)
}
