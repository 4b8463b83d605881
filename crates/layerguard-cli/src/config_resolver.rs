//! Configuration file lookup.
//!
//! The first match wins:
//!
//! 1. `--config` flag or `$LAYERGUARD_CONFIG` (explicit path)
//! 2. `layerguard.toml` or `.layerguard.toml` in the start directory or the
//!    nearest ancestor that has one, stopping at the first directory that
//!    holds a `go.mod`
//! 3. `$LAYERGUARD_CONFIG_DIR/config.toml` or `~/.layerguard/config.toml`
//! 4. Built-in defaults

use std::fmt;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given on the command line.
    Explicit(PathBuf),
    /// Found next to the code being checked.
    Project(PathBuf),
    /// Per-user fallback.
    Global(PathBuf),
    /// Nothing found; built-in defaults apply.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` if the config came from the per-user directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{} (explicit)", p.display()),
            Self::Project(p) => write!(f, "{} (project)", p.display()),
            Self::Global(p) => write!(f, "{} (global)", p.display()),
            Self::Default => write!(f, "built-in defaults"),
        }
    }
}

const PROJECT_CONFIG_NAMES: &[&str] = &["layerguard.toml", ".layerguard.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration file for a run started in `start_dir`.
#[must_use]
pub fn resolve(start_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    let source = resolve_inner(start_dir, explicit, global_config_dir());
    tracing::debug!("Configuration: {}", source);
    source
}

/// Lookup with the global directory passed in, so tests need no env vars.
fn resolve_inner(
    start_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    // A missing explicit file is reported when it is loaded.
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = find_project_config(start_dir) {
        return ConfigSource::Project(found);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, ConfigSource::Global)
}

/// Searches `start_dir` and its ancestors up to the enclosing module root.
fn find_project_config(start_dir: &Path) -> Option<PathBuf> {
    let start = std::fs::canonicalize(start_dir).unwrap_or_else(|_| start_dir.to_path_buf());

    for dir in start.ancestors() {
        if let Some(found) = PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
        {
            return Some(found);
        }
        if dir.join("go.mod").is_file() {
            break;
        }
    }

    None
}

/// Per-user config directory: `$LAYERGUARD_CONFIG_DIR` > `~/.layerguard/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("LAYERGUARD_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".layerguard"))
}
