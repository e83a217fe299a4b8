//! First-run setup for localdev.
//!
//! Collects the configuration record interactively (or from overrides in
//! non-interactive mode), validates it, and persists it next to the
//! mirrored project.

pub mod prompt;
pub mod wizard;

pub use wizard::{WizardOverrides, run_wizard};
