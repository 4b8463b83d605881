//! Check orchestration: traversal, resolution and checking for a whole target.

use std::path::{Path, PathBuf};

use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigError};
use crate::engine::ViolationChecker;
use crate::layer::LayerOrder;
use crate::module::Module;
use crate::resolver::Resolver;
use crate::types::{CheckReport, CheckResult, ResultType};
use crate::walker::{walk, IgnoreMatcher, WalkEntry};

/// Checks every file under a target against the configured layer order.
///
/// Construction validates the configuration and resolves the module, so a
/// built `Checker` can no longer fail: per-file problems become
/// [`ResultType::Warning`] results.
#[derive(Debug)]
pub struct Checker {
    config: Config,
    order: LayerOrder,
    module: Module,
    ignore: IgnoreMatcher,
}

/// Outcome of one traversal entry.
struct EntryOutcome {
    checked: bool,
    result: Option<CheckResult>,
}

impl Checker {
    /// Validates `config` and prepares a checker.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the layer order, the ignore list or the
    /// target path is invalid, or no module import path can be found.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let order = config.layer_order()?;
        let ignore = IgnoreMatcher::new(&config.ignore)?;
        let module = Module::resolve(&config.target_path, config.module.as_deref(), &order)?;

        debug!(
            "Module {} rooted at {}",
            module.path(),
            module.root().display()
        );

        Ok(Self {
            config,
            order,
            module,
            ignore,
        })
    }

    /// The validated layer order.
    #[must_use]
    pub fn order(&self) -> &LayerOrder {
        &self.order
    }

    /// The module under analysis.
    #[must_use]
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// The configuration this checker was built from.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the check, returning results in traversal order.
    #[must_use]
    pub fn run(&self) -> CheckReport {
        info!(
            "Checking {} against {} layer(s)",
            self.config.target_path.display(),
            self.order.len()
        );

        let entries = walk(&self.config.target_path, &self.ignore);
        let outcomes = self.check_entries(&entries);

        let mut report = CheckReport::default();
        for outcome in outcomes {
            if outcome.checked {
                report.files_checked += 1;
            }
            report.results.extend(outcome.result);
        }

        info!(
            "Check complete: {} violation(s) in {} file(s)",
            report.count(ResultType::Violated),
            report.files_checked
        );

        report
    }

    /// Runs the check and returns only the results.
    #[must_use]
    pub fn check(&self) -> Vec<CheckResult> {
        self.run().results
    }

    /// Checks one source file.
    ///
    /// Returns `None` for files outside every layer and, unless `verbose`
    /// is set, for files that respect the order.
    #[must_use]
    pub fn check_file(&self, path: &Path) -> Option<CheckResult> {
        self.check_source(path).result
    }

    fn check_entries(&self, entries: &[WalkEntry]) -> Vec<EntryOutcome> {
        let Some(threads) = self.config.parallelism else {
            return entries.par_iter().map(|e| self.check_entry(e)).collect();
        };

        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| entries.par_iter().map(|e| self.check_entry(e)).collect()),
            Err(e) => {
                warn!("Falling back to sequential checks: {}", e);
                entries.iter().map(|e| self.check_entry(e)).collect()
            }
        }
    }

    fn check_entry(&self, entry: &WalkEntry) -> EntryOutcome {
        match entry {
            WalkEntry::Source(path) => self.check_source(path),
            WalkEntry::Ignored(path) => EntryOutcome {
                checked: false,
                result: self
                    .config
                    .verbose
                    .then(|| CheckResult::new(ResultType::Ignored, path, path.display().to_string())),
            },
            WalkEntry::Unreadable { path, message } => {
                warn!("Cannot read {}: {}", path.display(), message);
                EntryOutcome {
                    checked: false,
                    result: Some(CheckResult::new(ResultType::Warning, path, message.clone())),
                }
            }
        }
    }

    fn check_source(&self, path: &Path) -> EntryOutcome {
        let Some(layer) = self.layer_of(path) else {
            debug!("{} is outside every layer", path.display());
            return EntryOutcome {
                checked: false,
                result: None,
            };
        };

        let resolver = Resolver::new(&self.order, &self.module);
        let checker = ViolationChecker::new(&self.order);

        let result = match resolver.retrieve_dependencies(path, layer) {
            Ok(dependencies) => checker.check_file(path, &dependencies).or_else(|| {
                self.config
                    .verbose
                    .then(|| ViolationChecker::verified(path))
            }),
            Err(e) => {
                warn!("{}", e);
                Some(CheckResult::new(ResultType::Warning, path, e.to_string()))
            }
        };

        EntryOutcome {
            checked: true,
            result,
        }
    }

    fn layer_of(&self, path: &Path) -> Option<usize> {
        let absolute = absolute_path(path);
        let relative = self.module.relative_file(&absolute)?;
        self.order.classify_file(relative)
    }
}

/// Canonical form of `path`; a dangling link keeps its own name under its
/// canonical parent.
fn absolute_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| match (path.parent(), path.file_name()) {
            (Some(dir), Some(name)) => std::fs::canonicalize(dir).map(|d| d.join(name)),
            _ => Ok(path.to_path_buf()),
        })
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Validates `config` and checks its target.
///
/// # Errors
///
/// Returns a [`ConfigError`] before any traversal if the configuration is
/// invalid. Violations are results, never errors.
pub fn check(config: Config) -> Result<Vec<CheckResult>, ConfigError> {
    Ok(Checker::new(config)?.check())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn module_dir() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("go.mod"), "module example.com/shop\n\ngo 1.21\n").unwrap();
        tmp
    }

    fn write(root: &Path, rel: &str, src: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, src).unwrap();
        path
    }

    #[test]
    fn rejects_invalid_order_before_traversal() {
        let tmp = module_dir();
        let config = Config {
            target_path: tmp.path().to_path_buf(),
            dependency_orders: vec![],
            ..Config::default()
        };
        assert!(matches!(
            Checker::new(config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn rejects_missing_target() {
        let config = Config::for_target("/nonexistent/layerguard/target");
        assert!(matches!(
            check(config),
            Err(ConfigError::TargetNotFound { .. })
        ));
    }

    #[test]
    fn files_outside_layers_are_not_checked() {
        let tmp = module_dir();
        write(tmp.path(), "cmd/main.go", "package main\n\nimport \"example.com/shop/adapter\"\n");
        let report = Checker::new(Config::for_target(tmp.path())).unwrap().run();
        assert!(report.results.is_empty());
        assert_eq!(report.files_checked, 0);
    }

    #[test]
    fn verbose_reports_verified_and_ignored() {
        let tmp = module_dir();
        write(tmp.path(), "domain/user.go", "package domain\n\nimport \"fmt\"\n");
        write(tmp.path(), "domain/testdata/x.go", "package testdata\n");
        let config = Config {
            verbose: true,
            ..Config::for_target(tmp.path())
        };
        let results = check(config).unwrap();
        let types: Vec<ResultType> = results.iter().map(|r| r.result_type).collect();
        assert_eq!(types, vec![ResultType::Ignored, ResultType::Verified]);
    }

    #[test]
    fn explicit_parallelism_keeps_traversal_order() {
        let tmp = module_dir();
        for name in ["a", "b", "c", "d"] {
            write(
                tmp.path(),
                &format!("application/{name}.go"),
                "package application\n\nimport \"example.com/shop/adapter\"\n",
            );
        }
        let config = Config {
            parallelism: Some(3),
            ..Config::for_target(tmp.path())
        };
        let results = check(config).unwrap();
        let names: Vec<String> = results
            .iter()
            .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.go", "b.go", "c.go", "d.go"]);
    }
}
