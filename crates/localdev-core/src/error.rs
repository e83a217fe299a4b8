//! Error types for the `localdev` core library.

use thiserror::Error;

/// Result type alias using [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading, validating, or persisting the
/// configuration record.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The persisted file is not valid JSON. Treated as fatal at startup;
    /// a corrupt record must never be silently repaired.
    #[error("configuration file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A field failed its validation constraint.
    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
