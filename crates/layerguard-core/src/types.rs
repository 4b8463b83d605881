//! Core types for dependency edges and check results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kind of a per-file check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    /// The file depends on a layer it may not import.
    Violated,
    /// The file was checked and respects the order.
    Verified,
    /// The entry matched an ignore pattern.
    Ignored,
    /// The file could not be checked (e.g. it is unreadable).
    Warning,
}

impl ResultType {
    /// Returns the presentation color conventionally paired with this result.
    #[must_use]
    pub fn color(self) -> Color {
        match self {
            Self::Violated => Color::Red,
            Self::Verified => Color::Green,
            Self::Ignored | Self::Warning => Color::Yellow,
        }
    }
}

impl std::fmt::Display for ResultType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Violated => write!(f, "Violated"),
            Self::Verified => write!(f, "Verified"),
            Self::Ignored => write!(f, "Ignored"),
            Self::Warning => write!(f, "Warning"),
        }
    }
}

/// Presentation color tag carried for reporters. Not used in any decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Violations.
    Red,
    /// Verified files.
    Green,
    /// Ignored entries and warnings.
    Yellow,
}

impl Color {
    /// ANSI SGR escape sequence that switches to this color.
    #[must_use]
    pub fn ansi(self) -> &'static str {
        match self {
            Self::Red => "\x1b[31m",
            Self::Green => "\x1b[32m",
            Self::Yellow => "\x1b[33m",
        }
    }
}

/// One internal import edge discovered while resolving a start file.
///
/// `file_path` and `file_layer` always describe the top-level file the
/// resolution started from, so an edge found several hops away is still
/// attributed to the file that ultimately pulls it in. `via` is the file
/// whose import declaration produced the edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Start file of the resolution.
    pub file_path: PathBuf,
    /// Rank of the start file's layer.
    pub file_layer: usize,
    /// File that declares the import.
    pub via: PathBuf,
    /// Import path literal, quotes included (e.g. `"github.com/acme/app/domain"`).
    pub import_path: String,
    /// Rank of the imported package's layer, `None` if it sits outside every layer.
    pub import_layer: Option<usize>,
}

impl Dependency {
    /// Returns true if the edge was declared by the start file itself.
    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.via == self.file_path
    }
}

/// Outcome of checking one file (or one ignored entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Result kind.
    pub result_type: ResultType,
    /// Path of the checked file or ignored entry.
    pub path: PathBuf,
    /// Human-readable description.
    pub message: String,
    /// Presentation color.
    pub color: Color,
}

impl CheckResult {
    /// Creates a result whose color follows from its type.
    #[must_use]
    pub fn new(result_type: ResultType, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            result_type,
            path: path.into(),
            message: message.into(),
            color: result_type.color(),
        }
    }

    /// Returns true for [`ResultType::Violated`].
    #[must_use]
    pub fn is_violation(&self) -> bool {
        self.result_type == ResultType::Violated
    }
}

impl std::fmt::Display for CheckResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.result_type, self.message)
    }
}

/// Results of a check run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    /// Results in traversal order.
    pub results: Vec<CheckResult>,
    /// Number of layered source files that were checked.
    pub files_checked: usize,
}

impl CheckReport {
    /// Returns true if any file violates the order.
    #[must_use]
    pub fn has_violations(&self) -> bool {
        self.results.iter().any(CheckResult::is_violation)
    }

    /// Number of results of the given type.
    #[must_use]
    pub fn count(&self, result_type: ResultType) -> usize {
        self.results
            .iter()
            .filter(|r| r.result_type == result_type)
            .count()
    }
}
