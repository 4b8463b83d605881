//! Layer classification: maps package paths to ranks in the dependency order.

use std::collections::HashSet;
use std::path::{Component, Path};

use crate::config::ConfigError;

/// Ordered, validated list of layer names.
///
/// A layer's rank is its position in the list. A file at rank `R` may import
/// packages whose layer rank is `>= R`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerOrder {
    names: Vec<String>,
    /// Per layer: (rank, path segments), sorted longest match first.
    matchers: Vec<(usize, Vec<String>)>,
}

impl LayerOrder {
    /// Builds an order from layer names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the list is empty, or a name is
    /// blank or appears twice.
    pub fn new<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|n| {
                let n: String = n.into();
                n.trim().trim_matches('/').to_owned()
            })
            .collect();

        if names.is_empty() {
            return Err(ConfigError::Validation(
                "layers.order: at least one layer is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &names {
            if name.is_empty() {
                return Err(ConfigError::Validation(
                    "layers.order: layer names must not be empty".into(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "layers.order: duplicate layer '{name}'"
                )));
            }
        }

        let mut matchers: Vec<(usize, Vec<String>)> = names
            .iter()
            .enumerate()
            .map(|(rank, name)| (rank, name.split('/').map(str::to_owned).collect()))
            .collect();
        // Longest name first (segments, then characters); stable sort keeps
        // configured order for equal lengths.
        matchers.sort_by(|a, b| {
            b.1.len()
                .cmp(&a.1.len())
                .then_with(|| seg_chars(&b.1).cmp(&seg_chars(&a.1)))
        });

        Ok(Self { names, matchers })
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false: construction rejects empty orders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Layer name at `rank`.
    #[must_use]
    pub fn name(&self, rank: usize) -> Option<&str> {
        self.names.get(rank).map(String::as_str)
    }

    /// All layer names in rank order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Classifies a slash-separated package path.
    ///
    /// A layer matches when its segments occur as a contiguous run of the
    /// path's segments, so `adapter` matches `internal/adapter/http` but not
    /// `adapters`. The longest matching layer name wins; equally long matches
    /// go to the layer that comes first in the order.
    #[must_use]
    pub fn classify(&self, package_path: &str) -> Option<usize> {
        let segments: Vec<&str> = package_path
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();

        self.matchers
            .iter()
            .find(|(_, layer)| contains_run(&segments, layer))
            .map(|(rank, _)| *rank)
    }

    /// Classifies a source file by its directory, relative to the module root.
    #[must_use]
    pub fn classify_file(&self, relative_file: &Path) -> Option<usize> {
        let dir = relative_file.parent().unwrap_or_else(|| Path::new(""));
        self.classify(&slash_path(dir))
    }

    /// Returns true if a file at `file_layer` may import `import_layer`.
    ///
    /// Packages outside every layer may always be imported.
    #[must_use]
    pub fn permits(&self, file_layer: usize, import_layer: Option<usize>) -> bool {
        import_layer.map_or(true, |rank| rank >= file_layer)
    }
}

fn seg_chars(segments: &[String]) -> usize {
    segments.iter().map(String::len).sum()
}

fn contains_run(haystack: &[&str], needle: &[String]) -> bool {
    !needle.is_empty()
        && haystack.len() >= needle.len()
        && haystack
            .windows(needle.len())
            .any(|w| w.iter().zip(needle).all(|(a, b)| *a == b.as_str()))
}

/// Renders a relative path with `/` separators, dropping `.` and root parts.
#[must_use]
pub fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
