//! Traversal of the target path with ignore filtering.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::ConfigError;
use crate::layer::slash_path;
use crate::resolver::is_go_source;

/// What the traversal should do with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkSignal {
    /// Process the entry normally.
    Continue,
    /// Ignored directory: skip it and everything below it.
    SkipDir,
    /// Ignored file: skip just this file.
    SkipFile,
}

#[derive(Debug, Clone)]
enum IgnoreEntry {
    Substring(String),
    Glob(glob::Pattern),
}

/// Compiled ignore list.
///
/// Entries with glob metacharacters (`*`, `?`, `[`) match the entry's path
/// relative to the target, or its file name. Plain entries match when the
/// file name contains them, so `_test` skips `user_test.go` and `.git`
/// skips the `.git` directory.
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    entries: Vec<IgnoreEntry>,
}

impl IgnoreMatcher {
    /// Compiles ignore entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pattern`] for an invalid glob.
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let entries = patterns
            .iter()
            .map(|p| {
                if p.contains(|c| matches!(c, '*' | '?' | '[')) {
                    glob::Pattern::new(p)
                        .map(IgnoreEntry::Glob)
                        .map_err(|e| ConfigError::Pattern {
                            pattern: p.clone(),
                            message: e.to_string(),
                        })
                } else {
                    Ok(IgnoreEntry::Substring(p.clone()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Returns true if an entry with this relative path and name is ignored.
    #[must_use]
    pub fn is_match(&self, relative: &Path, name: &str) -> bool {
        let rel = slash_path(relative);
        self.entries.iter().any(|entry| match entry {
            IgnoreEntry::Substring(s) => name.contains(s.as_str()),
            IgnoreEntry::Glob(g) => g.matches(&rel) || g.matches(name),
        })
    }

    /// Decides how the traversal treats an entry.
    #[must_use]
    pub fn signal(&self, relative: &Path, name: &str, is_dir: bool) -> WalkSignal {
        match (self.is_match(relative, name), is_dir) {
            (false, _) => WalkSignal::Continue,
            (true, true) => WalkSignal::SkipDir,
            (true, false) => WalkSignal::SkipFile,
        }
    }
}

/// One entry produced by [`walk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEntry {
    /// A Go source file to check.
    Source(PathBuf),
    /// An ignored file or directory.
    Ignored(PathBuf),
    /// An entry that could not be read.
    Unreadable {
        /// Offending path, if known.
        path: PathBuf,
        /// Error description.
        message: String,
    },
}

/// Walks `target` in file-name order.
///
/// `target` may be a single file. The target itself is never ignored; below
/// it, ignored directories are skipped with their whole subtree and ignored
/// files are skipped individually. Only non-test `.go` files are yielded as
/// sources.
#[must_use]
pub fn walk(target: &Path, ignore: &IgnoreMatcher) -> Vec<WalkEntry> {
    let mut entries = Vec::new();
    let mut it = WalkDir::new(target).sort_by_file_name().into_iter();

    while let Some(next) = it.next() {
        let entry = match next {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map_or_else(|| target.to_path_buf(), Path::to_path_buf);
                entries.push(WalkEntry::Unreadable {
                    path,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let path = entry.path();
        let is_dir = entry.file_type().is_dir();

        if entry.depth() > 0 {
            let relative = path.strip_prefix(target).unwrap_or(path);
            let name = entry.file_name().to_string_lossy();
            match ignore.signal(relative, &name, is_dir) {
                WalkSignal::Continue => {}
                WalkSignal::SkipDir => {
                    debug!("Ignoring directory {}", path.display());
                    entries.push(WalkEntry::Ignored(path.to_path_buf()));
                    it.skip_current_dir();
                    continue;
                }
                WalkSignal::SkipFile => {
                    debug!("Ignoring {}", path.display());
                    entries.push(WalkEntry::Ignored(path.to_path_buf()));
                    continue;
                }
            }
        }

        if !is_dir && is_go_source(path) {
            entries.push(WalkEntry::Source(path.to_path_buf()));
        }
    }

    entries
}
