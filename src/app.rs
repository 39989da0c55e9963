//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - installs logging
//! - resolves input/output paths (defaults, `.env`, environment)
//! - runs the ingest -> render pipeline

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

pub use pipeline::RunOutcome;

/// Overrides the input CSV path.
pub const ENV_INPUT: &str = "STEP_CHART_INPUT";
/// Overrides the output PNG path.
pub const ENV_OUTPUT: &str = "STEP_CHART_OUTPUT";

/// Entry point for the `step-chart` binary.
pub fn run() -> Result<RunOutcome, AppError> {
    init_tracing();
    let config = run_config_from_env();
    run_with(&config)
}

/// Run the pipeline for an explicit configuration.
pub fn run_with(config: &RunConfig) -> Result<RunOutcome, AppError> {
    pipeline::run_pipeline(config)
}

/// Resolve the run configuration, reading `.env` first if one exists.
pub fn run_config_from_env() -> RunConfig {
    dotenvy::dotenv().ok();
    run_config_from_vars(|key| std::env::var(key).ok())
}

fn run_config_from_vars(lookup: impl Fn(&str) -> Option<String>) -> RunConfig {
    let defaults = RunConfig::default();
    let path_var = |key: &str| {
        lookup(key)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    };

    RunConfig {
        input_path: path_var(ENV_INPUT).unwrap_or(defaults.input_path),
        output_path: path_var(ENV_OUTPUT).unwrap_or(defaults.output_path),
    }
}

// Logs go to stderr; stdout is reserved for the user-facing diagnostics.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH};
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> RunConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        run_config_from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_overrides() {
        let config = config_from(&[]);
        assert_eq!(config.input_path, PathBuf::from(DEFAULT_INPUT_PATH));
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
    }

    #[test]
    fn environment_overrides_paths() {
        let config = config_from(&[(ENV_INPUT, "logs/run1.csv"), (ENV_OUTPUT, "out/run1.png")]);
        assert_eq!(config.input_path, PathBuf::from("logs/run1.csv"));
        assert_eq!(config.output_path, PathBuf::from("out/run1.png"));
    }

    #[test]
    fn blank_override_is_ignored() {
        let config = config_from(&[(ENV_INPUT, "  ")]);
        assert_eq!(config.input_path, PathBuf::from(DEFAULT_INPUT_PATH));
    }
}
