//! `localdev` Core Library
//!
//! Shared functionality for `localdev` components:
//! - Configuration record, validation, and on-disk persistence
//! - Common error types
//! - Tracing initialisation

pub mod config;
pub mod error;
pub mod tracing_init;

pub use config::{CONFIG_FILE, Config};
pub use error::{ConfigError, Result};
