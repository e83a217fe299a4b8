//! Interactive prompts with bounded validation loops.
//!
//! Every question re-asks on an invalid answer, but iteratively and at
//! most [`MAX_ATTEMPTS`] times; a read failure (EOF, no TTY) aborts setup
//! immediately instead of looping.

use anyhow::{Result, bail};
use dialoguer::Input;

use localdev_core::config::{
    self, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_INTERVAL_SECS,
};

const MAX_ATTEMPTS: u32 = 3;

/// Ask until `parse` accepts the answer, bounded at [`MAX_ATTEMPTS`].
fn ask<T>(
    mut read: impl FnMut() -> Result<String>,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<T> {
    for _ in 0..MAX_ATTEMPTS {
        let answer = read()?;
        match parse(answer.trim()) {
            Ok(value) => return Ok(value),
            Err(reason) => tracing::warn!("invalid answer: {reason}"),
        }
    }
    bail!("no valid answer after {MAX_ATTEMPTS} attempts")
}

fn read_line(prompt_text: &str) -> impl FnMut() -> Result<String> {
    let prompt_text = prompt_text.to_string();
    move || {
        Input::<String>::new()
            .with_prompt(&prompt_text)
            .allow_empty(true)
            .interact_text()
            .map_err(anyhow::Error::from)
    }
}

fn parse_remote_url(raw: &str) -> Result<String, String> {
    config::validate_remote_url(raw)
        .map(|()| raw.to_string())
        .map_err(|e| e.to_string())
}

fn parse_user_id(raw: &str) -> Result<String, String> {
    config::validate_user_id(raw)
        .map(|()| raw.to_string())
        .map_err(|e| e.to_string())
}

/// Parse a numeric answer; an empty answer takes the default.
fn parse_number(
    raw: &str,
    default: u64,
    check: fn(u64) -> localdev_core::Result<()>,
) -> Result<u64, String> {
    if raw.is_empty() {
        return Ok(default);
    }
    let value: u64 = raw.parse().map_err(|_| format!("not a number: {raw:?}"))?;
    check(value).map(|()| value).map_err(|e| e.to_string())
}

/// Prompt for the cloud project's git endpoint. Required.
pub fn prompt_remote_url(non_interactive: bool) -> Result<String> {
    if non_interactive {
        bail!("--remote-url is required in non-interactive mode");
    }
    ask(
        read_line("Project git URL (https://api.glitch.com/<project>/git)"),
        parse_remote_url,
    )
}

/// Prompt for the identity token from the platform's git/export tool.
/// Required.
pub fn prompt_user_id(non_interactive: bool) -> Result<String> {
    if non_interactive {
        bail!("--user-id is required in non-interactive mode");
    }
    ask(
        read_line("User ID (from the 'Git, Import, Export' tool)"),
        parse_user_id,
    )
}

/// Prompt for the push interval in seconds.
pub fn prompt_interval(non_interactive: bool) -> Result<u64> {
    if non_interactive {
        return Ok(DEFAULT_INTERVAL_SECS);
    }
    ask(
        read_line("Push interval in seconds (5-900, default 15)"),
        |raw| parse_number(raw, DEFAULT_INTERVAL_SECS, config::validate_interval),
    )
}

/// Prompt for the inactivity timeout in seconds.
pub fn prompt_idle_timeout(non_interactive: bool) -> Result<u64> {
    if non_interactive {
        return Ok(DEFAULT_IDLE_TIMEOUT_SECS);
    }
    ask(
        read_line("Inactivity timeout in seconds (0 = never stop, default 1800)"),
        |raw| parse_number(raw, DEFAULT_IDLE_TIMEOUT_SECS, config::validate_idle_timeout),
    )
}

/// Prompt for the editor autosave delay in milliseconds.
pub fn prompt_autosave(non_interactive: bool) -> Result<u64> {
    if non_interactive {
        return Ok(0);
    }
    ask(
        read_line("Editor autosave delay in ms (0 = skip, default 0)"),
        |raw| parse_number(raw, 0, config::validate_autosave),
    )
}
