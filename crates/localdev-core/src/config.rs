//! Configuration record for localdev.
//!
//! A single JSON file (`.localdev.json`) inside the mirrored working
//! directory holds everything the daemon needs: the remote git endpoint,
//! the user's identity token, the sync cadence, the idle timeout, and the
//! timestamp of the last detected change. The record is validated once at
//! load time; a daemon never runs against unvalidated settings.

use std::path::Path;
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// File name of the persisted configuration, relative to the working
/// directory. Also listed in the seeded `.gitignore` so it never syncs.
pub const CONFIG_FILE: &str = ".localdev.json";

/// Default sync cadence in seconds.
pub const DEFAULT_INTERVAL_SECS: u64 = 15;
/// Default idle timeout in seconds (half an hour of no changes).
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 1800;

const MIN_INTERVAL_SECS: u64 = 5;
const MAX_INTERVAL_SECS: u64 = 900;
const MAX_IDLE_TIMEOUT_SECS: u64 = 86_400;
const MAX_AUTOSAVE_MILLIS: u64 = 60_000;

/// Shape of the hosting platform's git endpoint: `https://api.glitch.com/<project>/git`
/// where `<project>` is a lowercase hyphenated slug.
static REMOTE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://api\.glitch\.com/[a-z]+(?:-[a-z]+)+/git$").expect("static regex is valid")
});

/// Shape of the platform's identity token (five hex groups).
static USER_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-f0-9]+-){4}[a-f0-9]+$").expect("static regex is valid"));

/// The validated configuration record.
///
/// Immutable for the lifetime of the daemon except for `last_update`,
/// which is rewritten after every dirty cycle so idle time survives a
/// process restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote git endpoint of the cloud IDE project.
    pub remote_url: String,
    /// Identity token used by the platform's git endpoint.
    pub user_id: String,
    /// Seconds between sync cycles (5-900).
    pub interval_secs: u64,
    /// Seconds of inactivity after which the daemon stops itself.
    /// `0` disables the timeout.
    pub idle_timeout_secs: u64,
    /// Editor autosave delay in milliseconds; `0` skips autosave seeding.
    #[serde(default)]
    pub autosave_millis: u64,
    /// Epoch seconds of the last detected change. Monotonically
    /// non-decreasing.
    pub last_update: i64,
}

impl Config {
    /// Check every field constraint. Violations name the offending field.
    pub fn validate(&self) -> Result<()> {
        validate_remote_url(&self.remote_url)?;
        validate_user_id(&self.user_id)?;
        validate_interval(self.interval_secs)?;
        validate_idle_timeout(self.idle_timeout_secs)?;
        validate_autosave(self.autosave_millis)?;
        if self.last_update < 0 {
            return Err(ConfigError::Invalid {
                field: "last_update",
                reason: format!("must be a non-negative epoch timestamp, got {}", self.last_update),
            });
        }
        Ok(())
    }

    /// Load and validate a persisted record.
    ///
    /// A malformed or invalid file is fatal to startup: the error is
    /// returned as-is and nothing is repaired in place.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Persist the record as pretty-printed JSON.
    pub fn store(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Advance `last_update`, never moving it backwards.
    pub fn touch(&mut self, now: i64) {
        self.last_update = self.last_update.max(now);
    }

    /// Remote URL with the identity token as userinfo, the form the
    /// platform's git endpoint authenticates.
    pub fn authenticated_remote(&self) -> String {
        self.remote_url
            .replacen("https://", &format!("https://{}@", self.user_id), 1)
    }
}

/// Validate the remote URL against the platform's git-endpoint shape.
pub fn validate_remote_url(url: &str) -> Result<()> {
    if REMOTE_URL_RE.is_match(url) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field: "remote_url",
            reason: format!("expected https://api.glitch.com/<project>/git, got {url:?}"),
        })
    }
}

/// Validate the identity token shape.
pub fn validate_user_id(id: &str) -> Result<()> {
    if USER_ID_RE.is_match(id) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field: "user_id",
            reason: format!("expected a hex identity token (aaaa-bbbb-cccc-dddd-eeee), got {id:?}"),
        })
    }
}

/// Validate the sync cadence (5-900 seconds).
pub fn validate_interval(secs: u64) -> Result<()> {
    if (MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&secs) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field: "interval_secs",
            reason: format!("must be {MIN_INTERVAL_SECS}-{MAX_INTERVAL_SECS} seconds, got {secs}"),
        })
    }
}

/// Validate the idle timeout (0 disables, otherwise 1-86400 seconds).
pub fn validate_idle_timeout(secs: u64) -> Result<()> {
    if secs <= MAX_IDLE_TIMEOUT_SECS {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field: "idle_timeout_secs",
            reason: format!("must be 0 (disabled) or 1-{MAX_IDLE_TIMEOUT_SECS} seconds, got {secs}"),
        })
    }
}

/// Validate the autosave delay (0 disables, capped at one minute).
pub fn validate_autosave(millis: u64) -> Result<()> {
    if millis <= MAX_AUTOSAVE_MILLIS {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field: "autosave_millis",
            reason: format!("must be 0 (disabled) or up to {MAX_AUTOSAVE_MILLIS} ms, got {millis}"),
        })
    }
}

/// Current wall-clock time as whole seconds since the epoch.
pub fn epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            remote_url: "https://api.glitch.com/curly-fern/git".into(),
            user_id: "48970c11-a9bd-cc3e-2188-ef34cbd44f31".into(),
            interval_secs: 15,
            idle_timeout_secs: 1800,
            autosave_millis: 0,
            last_update: 1_700_000_000,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn remote_url_shape() {
        assert!(validate_remote_url("https://api.glitch.com/curly-fern/git").is_ok());
        assert!(validate_remote_url("https://api.glitch.com/one-two-three/git").is_ok());
        assert!(validate_remote_url("https://api.glitch.com/noslug/git").is_err());
        assert!(validate_remote_url("https://api.glitch.com/curly-fern").is_err());
        assert!(validate_remote_url("http://api.glitch.com/curly-fern/git").is_err());
        assert!(validate_remote_url("https://example.com/curly-fern/git").is_err());
        assert!(validate_remote_url("").is_err());
    }

    #[test]
    fn user_id_shape() {
        assert!(validate_user_id("48970c11-a9bd-cc3e-2188-ef34cbd44f31").is_ok());
        assert!(validate_user_id("a-b-c-d-e").is_ok());
        assert!(validate_user_id("48970C11-a9bd-cc3e-2188-ef34cbd44f31").is_err());
        assert!(validate_user_id("48970c11-a9bd-cc3e-2188").is_err());
        assert!(validate_user_id("not a token").is_err());
    }

    #[test]
    fn interval_bounds() {
        assert!(validate_interval(5).is_ok());
        assert!(validate_interval(900).is_ok());
        assert!(validate_interval(4).is_err());
        assert!(validate_interval(901).is_err());
        assert!(validate_interval(0).is_err());
    }

    #[test]
    fn idle_timeout_bounds() {
        assert!(validate_idle_timeout(0).is_ok());
        assert!(validate_idle_timeout(1).is_ok());
        assert!(validate_idle_timeout(86_400).is_ok());
        assert!(validate_idle_timeout(86_401).is_err());
    }

    #[test]
    fn invalid_field_is_named() {
        let mut config = valid_config();
        config.interval_secs = 2;
        let err = config.validate().expect_err("interval out of range");
        assert!(err.to_string().contains("interval_secs"));
    }

    #[test]
    fn store_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);

        let config = valid_config();
        config.store(&path).expect("store");

        let loaded = Config::load(&path).expect("load");
        assert_eq!(loaded.remote_url, config.remote_url);
        assert_eq!(loaded.user_id, config.user_id);
        assert_eq!(loaded.interval_secs, config.interval_secs);
        assert_eq!(loaded.idle_timeout_secs, config.idle_timeout_secs);
        assert_eq!(loaded.last_update, config.last_update);
    }

    #[test]
    fn corrupt_file_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").expect("write");

        assert!(matches!(Config::load(&path), Err(ConfigError::Corrupt(_))));
    }

    #[test]
    fn well_formed_but_invalid_file_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        let mut config = valid_config();
        config.remote_url = "https://example.com/x/git".into();
        std::fs::write(&path, serde_json::to_string(&config).expect("json")).expect("write");

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::Invalid { field: "remote_url", .. })
        ));
    }

    #[test]
    fn missing_autosave_defaults_to_zero() {
        let raw = r#"{
            "remote_url": "https://api.glitch.com/curly-fern/git",
            "user_id": "48970c11-a9bd-cc3e-2188-ef34cbd44f31",
            "interval_secs": 15,
            "idle_timeout_secs": 1800,
            "last_update": 0
        }"#;
        let config: Config = serde_json::from_str(raw).expect("parse");
        assert_eq!(config.autosave_millis, 0);
    }

    #[test]
    fn authenticated_remote_injects_user_id() {
        let config = valid_config();
        assert_eq!(
            config.authenticated_remote(),
            "https://48970c11-a9bd-cc3e-2188-ef34cbd44f31@api.glitch.com/curly-fern/git"
        );
    }

    #[test]
    fn touch_never_moves_backwards() {
        let mut config = valid_config();
        let before = config.last_update;
        config.touch(before - 100);
        assert_eq!(config.last_update, before);
        config.touch(before + 100);
        assert_eq!(config.last_update, before + 100);
    }
}
