//! Shared tracing/logging initialization.
//!
//! Both the daemon and the setup wizard use the same pattern for setting
//! up `tracing_subscriber` with an env-filter and optional JSON output.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates covered by the default filter; third-party noise stays off
/// unless `RUST_LOG` asks for it.
const LOG_TARGETS: [&str; 3] = ["localdev_daemon", "localdev_core", "localdev_setup"];

/// Default `RUST_LOG` value for a given level, e.g.
/// `localdev_daemon=info,localdev_core=info,localdev_setup=info`.
pub fn default_filter(level: &str) -> String {
    LOG_TARGETS
        .map(|target| format!("{target}={level}"))
        .join(",")
}

/// Initialise the global tracing subscriber.
///
/// `level` applies to the localdev crates when `RUST_LOG` is not set;
/// `log_json` switches to structured JSON log lines.
pub fn init_tracing(level: &str, log_json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter(level)),
    );
    if log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
