//! Configuration for a check run.
//!
//! A [`Config`] is passed by value into every entry point; nothing is read
//! from global state. It can be built in code or loaded from TOML:
//!
//! ```toml
//! [analyzer]
//! target = "."
//! ignore = ["test", ".git"]
//! module = "github.com/acme/app"   # optional, defaults to go.mod
//!
//! [layers]
//! order = ["external", "adapter", "application", "domain"]
//!
//! [output]
//! violations_at_bottom = false
//! ```

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::layer::LayerOrder;

/// Layer order used when no configuration file provides one.
pub const DEFAULT_DEPENDENCY_ORDERS: &[&str] = &["external", "adapter", "application", "domain"];

/// Ignore entries used when no configuration file provides them.
pub const DEFAULT_IGNORE: &[&str] = &["test", ".git"];

/// Configuration for one check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// File or directory to check.
    pub target_path: PathBuf,

    /// Layer names; a file at position `i` may import layers at positions `>= i`.
    pub dependency_orders: Vec<String>,

    /// Path substrings or glob patterns to skip during traversal.
    pub ignore: Vec<String>,

    /// Import path of the module under analysis. Read from `go.mod` if unset.
    pub module: Option<String>,

    /// Also report verified files and ignored entries.
    pub verbose: bool,

    /// Worker threads for per-file checks (`None` lets rayon decide).
    pub parallelism: Option<usize>,

    /// Print violations after every other result.
    pub violations_at_bottom: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_path: default_target(),
            dependency_orders: default_orders(),
            ignore: default_ignore(),
            module: None,
            verbose: false,
            parallelism: None,
            violations_at_bottom: false,
        }
    }
}

fn default_target() -> PathBuf {
    PathBuf::from(".")
}

fn default_orders() -> Vec<String> {
    DEFAULT_DEPENDENCY_ORDERS.iter().map(|s| (*s).to_owned()).collect()
}

fn default_ignore() -> Vec<String> {
    DEFAULT_IGNORE.iter().map(|s| (*s).to_owned()).collect()
}

/// Errors when loading or validating configuration.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ConfigError {
    /// Failed to read config file.
    #[error("failed to read {path}: {source}")]
    #[diagnostic(code(layerguard::config::io))]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// IO error.
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("invalid config: {message}")]
    #[diagnostic(code(layerguard::config::parse))]
    Parse {
        /// Parse error detail.
        message: String,
    },

    /// Config is structurally invalid.
    #[error("config validation: {0}")]
    #[diagnostic(
        code(layerguard::config::validation),
        help("[layers] order needs at least one unique, non-empty layer name")
    )]
    Validation(String),

    /// An ignore entry is not a valid glob.
    #[error("invalid ignore pattern '{pattern}': {message}")]
    #[diagnostic(code(layerguard::config::ignore))]
    Pattern {
        /// The offending entry.
        pattern: String,
        /// Glob error detail.
        message: String,
    },

    /// The target path does not exist.
    #[error("target path {path} does not exist")]
    #[diagnostic(code(layerguard::config::target))]
    TargetNotFound {
        /// Requested target.
        path: PathBuf,
    },

    /// No module import path could be determined.
    #[error("no go.mod found above {path}")]
    #[diagnostic(
        code(layerguard::config::module),
        help("run inside a Go module or set `module` in the [analyzer] section")
    )]
    ModuleNotFound {
        /// Target the search started from.
        path: PathBuf,
    },
}

impl Config {
    /// Creates a default configuration for `target`.
    #[must_use]
    pub fn for_target(target: impl Into<PathBuf>) -> Self {
        Self {
            target_path: target.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// Missing sections and keys fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns error if TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize, Default)]
        struct RawConfig {
            #[serde(default)]
            analyzer: AnalyzerSection,
            #[serde(default)]
            layers: LayersSection,
            #[serde(default)]
            output: OutputSection,
        }

        #[derive(Deserialize)]
        struct AnalyzerSection {
            #[serde(default = "default_target")]
            target: PathBuf,
            #[serde(default = "default_ignore")]
            ignore: Vec<String>,
            #[serde(default)]
            module: Option<String>,
            #[serde(default)]
            verbose: bool,
            #[serde(default)]
            parallelism: Option<usize>,
        }

        impl Default for AnalyzerSection {
            fn default() -> Self {
                Self {
                    target: default_target(),
                    ignore: default_ignore(),
                    module: None,
                    verbose: false,
                    parallelism: None,
                }
            }
        }

        #[derive(Deserialize)]
        struct LayersSection {
            #[serde(default = "default_orders")]
            order: Vec<String>,
        }

        impl Default for LayersSection {
            fn default() -> Self {
                Self {
                    order: default_orders(),
                }
            }
        }

        #[derive(Deserialize, Default)]
        struct OutputSection {
            #[serde(default)]
            violations_at_bottom: bool,
        }

        let raw: RawConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;

        Ok(Self {
            target_path: raw.analyzer.target,
            dependency_orders: raw.layers.order,
            ignore: raw.analyzer.ignore,
            module: raw.analyzer.module,
            verbose: raw.analyzer.verbose,
            parallelism: raw.analyzer.parallelism,
            violations_at_bottom: raw.output.violations_at_bottom,
        })
    }

    /// Builds the validated layer order.
    ///
    /// # Errors
    ///
    /// Returns error if the order is empty or has blank or duplicate names.
    pub fn layer_order(&self) -> Result<LayerOrder, ConfigError> {
        LayerOrder::new(self.dependency_orders.iter().cloned())
    }

    /// Validate config consistency that does not touch the filesystem.
    ///
    /// # Errors
    ///
    /// Returns error describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layer_order()?;

        if self.parallelism == Some(0) {
            return Err(ConfigError::Validation(
                "analyzer.parallelism must be at least 1".into(),
            ));
        }

        if let Some(module) = &self.module {
            if module.trim().trim_matches('/').is_empty() {
                return Err(ConfigError::Validation(
                    "analyzer.module must not be empty".into(),
                ));
            }
        }

        for pattern in &self.ignore {
            if pattern.is_empty() {
                return Err(ConfigError::Validation(
                    "analyzer.ignore entries must not be empty".into(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config_uses_defaults() {
        let config = Config::parse("").expect("parse failed");
        assert_eq!(config, Config::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[analyzer]
target = "./internal"
ignore = ["mock", "*_gen.go"]
module = "github.com/acme/app"
verbose = true
parallelism = 2

[layers]
order = ["external", "adapter", "application", "domain"]

[output]
violations_at_bottom = true
"#;
        let config = Config::parse(toml).expect("parse failed");
        assert_eq!(config.target_path, PathBuf::from("./internal"));
        assert_eq!(config.ignore, vec!["mock", "*_gen.go"]);
        assert_eq!(config.module.as_deref(), Some("github.com/acme/app"));
        assert!(config.verbose);
        assert_eq!(config.parallelism, Some(2));
        assert!(config.violations_at_bottom);
        assert_eq!(config.layer_order().expect("order").len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn analyzer_section_without_ignore_keeps_default_ignore() {
        let config = Config::parse("[analyzer]\nverbose = true\n").expect("parse failed");
        assert_eq!(config.ignore, vec!["test", ".git"]);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = Config::parse("[layers\norder = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn wrong_type_is_parse_error() {
        let err = Config::parse("[layers]\norder = \"domain\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn validate_catches_empty_order() {
        let config = Config::parse("[layers]\norder = []\n").expect("parse failed");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_catches_duplicate_layer() {
        let config =
            Config::parse("[layers]\norder = [\"domain\", \"domain\"]\n").expect("parse failed");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("domain"));
    }

    #[test]
    fn validate_catches_zero_parallelism() {
        let config = Config {
            parallelism: Some(0),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_catches_blank_module() {
        let config = Config {
            module: Some("  ".into()),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = Config::from_file(Path::new("/nonexistent/layerguard.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn for_target_keeps_defaults() {
        let config = Config::for_target("src");
        assert_eq!(config.target_path, PathBuf::from("src"));
        assert_eq!(config.dependency_orders, default_orders());
    }
}
