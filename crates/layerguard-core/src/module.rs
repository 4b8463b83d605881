//! Internal module namespace: which imports belong to the module under analysis.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::ConfigError;
use crate::layer::LayerOrder;

const GO_MOD: &str = "go.mod";

/// The Go module being checked: its import path and root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    path: String,
    root: PathBuf,
}

impl Module {
    /// Creates a module from an import path and a root directory.
    #[must_use]
    pub fn new(path: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        let path: String = path.into();
        Self {
            path: path.trim().trim_matches('/').to_owned(),
            root: root.into(),
        }
    }

    /// Determines the module for `target`.
    ///
    /// The root is the nearest ancestor directory holding a `go.mod`. The
    /// import path comes from `override_path` if given, otherwise from that
    /// file's `module` directive. With an override and no `go.mod`, a
    /// directory target is itself the root; for a file target the root is
    /// the nearest ancestor under which the file falls in one of `order`'s
    /// layers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TargetNotFound`] if `target` does not exist and
    /// [`ConfigError::ModuleNotFound`] if no import path or, for a file
    /// target without `go.mod`, no layered root can be determined.
    pub fn resolve(
        target: &Path,
        override_path: Option<&str>,
        order: &LayerOrder,
    ) -> Result<Self, ConfigError> {
        let start = std::fs::canonicalize(target).map_err(|_| ConfigError::TargetNotFound {
            path: target.to_path_buf(),
        })?;
        let is_file = start.is_file();
        let start_dir = if is_file {
            start.parent().map_or_else(|| start.clone(), Path::to_path_buf)
        } else {
            start.clone()
        };

        let found = find_go_mod(&start_dir);

        match (override_path, found) {
            (Some(path), Some((root, _))) => Ok(Self::new(path, root)),
            (Some(path), None) if is_file => layered_root(&start, order)
                .map(|root| Self::new(path, root))
                .ok_or_else(|| ConfigError::ModuleNotFound {
                    path: target.to_path_buf(),
                }),
            (Some(path), None) => Ok(Self::new(path, start_dir)),
            (None, Some((root, Some(path)))) => Ok(Self::new(path, root)),
            (None, _) => Err(ConfigError::ModuleNotFound {
                path: target.to_path_buf(),
            }),
        }
    }

    /// Module import path (e.g. `github.com/acme/app`).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Directory containing the module's packages.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// For an internal import, returns its path relative to the module root
    /// (`""` for the root package); `None` for standard-library and
    /// third-party imports.
    ///
    /// Accepts the import with or without quotes.
    #[must_use]
    pub fn relative_import<'a>(&self, import_path: &'a str) -> Option<&'a str> {
        let unquoted = import_path.trim_matches('"');
        let rest = unquoted.strip_prefix(self.path.as_str())?;
        if rest.is_empty() {
            Some("")
        } else {
            rest.strip_prefix('/')
        }
    }

    /// Directory of the package at `relative` (as returned by [`Self::relative_import`]).
    #[must_use]
    pub fn package_dir(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |dir, seg| dir.join(seg))
    }

    /// Path of `file` relative to the module root, if it lies inside it.
    #[must_use]
    pub fn relative_file<'a>(&self, file: &'a Path) -> Option<&'a Path> {
        file.strip_prefix(&self.root).ok()
    }
}

/// Walks up from `dir` looking for `go.mod`; returns its directory and module path.
/// Nearest ancestor of `file` relative to which the file is in a layer.
fn layered_root(file: &Path, order: &LayerOrder) -> Option<PathBuf> {
    let root = file.ancestors().skip(1).find(|dir| {
        file.strip_prefix(dir)
            .is_ok_and(|rel| order.classify_file(rel).is_some())
    })?;
    debug!("No go.mod; rooting {} at {}", file.display(), root.display());
    Some(root.to_path_buf())
}

fn find_go_mod(dir: &Path) -> Option<(PathBuf, Option<String>)> {
    for ancestor in dir.ancestors() {
        let candidate = ancestor.join(GO_MOD);
        if candidate.is_file() {
            debug!("Found {}", candidate.display());
            let path = std::fs::read_to_string(&candidate)
                .ok()
                .and_then(|content| parse_module_directive(&content));
            return Some((ancestor.to_path_buf(), path));
        }
    }
    None
}

/// Extracts the import path from a `go.mod` `module` directive.
#[must_use]
pub fn parse_module_directive(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let code = line.split("//").next().unwrap_or("").trim();
        let rest = code.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let path = rest.trim().trim_matches('"').trim_matches('`');
        (!path.is_empty()).then(|| path.to_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn order() -> LayerOrder {
        LayerOrder::new(["external", "adapter", "application", "domain"]).unwrap()
    }

    #[test]
    fn parses_module_directive() {
        let go_mod = "// comment\nmodule github.com/acme/app // trailing\n\ngo 1.21\n";
        assert_eq!(parse_module_directive(go_mod).as_deref(), Some("github.com/acme/app"));
    }

    #[test]
    fn parses_quoted_module_directive() {
        assert_eq!(
            parse_module_directive("module \"example.com/m\"\n").as_deref(),
            Some("example.com/m")
        );
    }

    #[test]
    fn ignores_lookalike_lines() {
        assert_eq!(parse_module_directive("modules foo\ngo 1.21\n"), None);
        assert_eq!(parse_module_directive("module\n"), None);
    }

    #[test]
    fn relative_import_for_internal_packages() {
        let m = Module::new("github.com/acme/app", "/src/app");
        assert_eq!(
            m.relative_import("\"github.com/acme/app/internal/domain\""),
            Some("internal/domain")
        );
        assert_eq!(m.relative_import("github.com/acme/app"), Some(""));
    }

    #[test]
    fn relative_import_rejects_external_packages() {
        let m = Module::new("github.com/acme/app", "/src/app");
        assert_eq!(m.relative_import("\"fmt\""), None);
        assert_eq!(m.relative_import("\"github.com/acme/application\""), None);
        assert_eq!(m.relative_import("\"github.com/other/lib\""), None);
    }

    #[test]
    fn package_dir_joins_segments() {
        let m = Module::new("m", "/src/app");
        assert_eq!(m.package_dir("internal/domain"), PathBuf::from("/src/app/internal/domain"));
        assert_eq!(m.package_dir(""), PathBuf::from("/src/app"));
    }

    #[test]
    fn resolve_reads_nearest_go_mod() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("go.mod"), "module example.com/shop\n").unwrap();
        let sub = tmp.path().join("adapter");
        fs::create_dir(&sub).unwrap();

        let m = Module::resolve(&sub, None, &order()).unwrap();
        assert_eq!(m.path(), "example.com/shop");
        assert_eq!(m.root(), fs::canonicalize(tmp.path()).unwrap());
    }

    #[test]
    fn resolve_from_single_file_target() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("go.mod"), "module example.com/shop\n").unwrap();
        let file = tmp.path().join("main.go");
        fs::write(&file, "package main\n").unwrap();

        let m = Module::resolve(&file, None, &order()).unwrap();
        assert_eq!(m.root(), fs::canonicalize(tmp.path()).unwrap());
    }

    #[test]
    fn override_wins_over_go_mod_path() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("go.mod"), "module example.com/shop\n").unwrap();

        let m = Module::resolve(tmp.path(), Some("example.com/renamed"), &order()).unwrap();
        assert_eq!(m.path(), "example.com/renamed");
    }

    #[test]
    fn override_without_go_mod_roots_at_target() {
        let tmp = TempDir::new().unwrap();
        let m = Module::resolve(tmp.path(), Some("example.com/m"), &order()).unwrap();
        assert_eq!(m.root(), fs::canonicalize(tmp.path()).unwrap());
    }

    #[test]
    fn override_without_go_mod_roots_file_above_its_layer() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("application");
        fs::create_dir(&dir).unwrap();
        let file = dir.join("svc.go");
        fs::write(&file, "package application\n").unwrap();

        let m = Module::resolve(&file, Some("example.com/m"), &order()).unwrap();
        assert_eq!(m.root(), fs::canonicalize(tmp.path()).unwrap());
        assert_eq!(
            m.package_dir("adapter"),
            fs::canonicalize(tmp.path()).unwrap().join("adapter")
        );
    }

    #[test]
    fn override_without_go_mod_and_unlayered_file_is_module_not_found() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("layerguard-unlayered");
        fs::create_dir(&dir).unwrap();
        let file = dir.join("main.go");
        fs::write(&file, "package main\n").unwrap();

        let only = LayerOrder::new(["layerguard-only-layer"]).unwrap();
        let err = Module::resolve(&file, Some("example.com/m"), &only).unwrap_err();
        assert!(matches!(err, ConfigError::ModuleNotFound { .. }));
    }

    #[test]
    fn no_go_mod_and_no_override_is_module_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = Module::resolve(tmp.path(), None, &order()).unwrap_err();
        assert!(matches!(err, ConfigError::ModuleNotFound { .. }));
    }

    #[test]
    fn missing_target_is_reported() {
        let err = Module::resolve(Path::new("/nonexistent/target"), None, &order()).unwrap_err();
        assert!(matches!(err, ConfigError::TargetNotFound { .. }));
    }
}
