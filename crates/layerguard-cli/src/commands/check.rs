//! Check command implementation.

use anyhow::{Context, Result};
use layerguard_core::{CheckReport, Checker, Config, ConfigError, ResultType};
use std::path::PathBuf;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Command-line overrides for a check run.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Target override; the config's `target` is used when absent.
    pub path: Option<PathBuf>,
    /// Output format.
    pub format: OutputFormat,
    /// Ignore entries appended to the configured ones.
    pub ignore: Vec<String>,
    /// Forces verbose results.
    pub verbose_results: bool,
}

/// Runs the check command and prints its results.
pub fn run(source: &ConfigSource, options: &CheckOptions) -> Result<CheckReport> {
    let config = effective_config(load_config(source)?, options);
    let bottom = config.violations_at_bottom;

    let checker = Checker::new(config)?;

    tracing::debug!(
        "Layer order: {}",
        checker.order().names().join(" -> ")
    );

    let report = checker.run();
    super::output::print(&report, options.format, bottom)?;
    Ok(report)
}

fn load_config(source: &ConfigSource) -> Result<Config> {
    match source {
        ConfigSource::Default => Ok(Config::default()),
        other => {
            // Invariant: non-Default variants always have a path
            let p = other.path().context("resolved config has no path")?;
            if source.is_global() {
                tracing::info!("Using global config: {}", p.display());
            }
            Ok(Config::from_file(p)?)
        }
    }
}

/// Applies command-line overrides on top of the loaded config.
fn effective_config(mut config: Config, options: &CheckOptions) -> Config {
    if let Some(path) = &options.path {
        config.target_path.clone_from(path);
    }
    config.ignore.extend(options.ignore.iter().cloned());
    config.verbose |= options.verbose_results;
    config
}

/// Process exit status for a finished run: 1 if any file violated the
/// order or could not be checked, 0 otherwise.
#[must_use]
pub fn exit_code(report: &CheckReport) -> i32 {
    if report.has_violations() || report.count(ResultType::Warning) > 0 {
        1
    } else {
        0
    }
}

/// Renders a failed run for stderr, once. Configuration errors get the
/// full diagnostic with code and help text.
#[must_use]
pub fn render_error(err: anyhow::Error) -> String {
    match err.downcast::<ConfigError>() {
        Ok(config_err) => format!("{:?}", miette::Report::new(config_err)),
        Err(other) => format!("Error: {other:#}"),
    }
}
