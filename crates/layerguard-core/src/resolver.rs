//! Dependency resolution: the transitive closure of a file's internal imports.

use std::collections::{HashSet, VecDeque};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::extractor::{read_imports, ImportInfo};
use crate::layer::LayerOrder;
use crate::module::Module;
use crate::types::Dependency;

/// Errors that stop resolution of a start file.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The start file could not be opened or read.
    #[error("failed to open {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// IO error.
        source: std::io::Error,
    },

    /// The requested layer rank does not exist in the order.
    #[error("layer rank {rank} is not defined (order has {layers} layer(s))")]
    UnknownLayer {
        /// Requested rank.
        rank: usize,
        /// Number of configured layers.
        layers: usize,
    },
}

/// Expands files into [`Dependency`] edges.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    order: &'a LayerOrder,
    module: &'a Module,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver for one module and layer order.
    #[must_use]
    pub fn new(order: &'a LayerOrder, module: &'a Module) -> Self {
        Self { order, module }
    }

    /// Collects every internal import edge reachable from `file_path`.
    ///
    /// Each internal import is recorded and the imported package's files are
    /// expanded in turn, breadth first. Every edge is tagged with
    /// `file_path` and `current_layer`. Standard-library and third-party
    /// imports are skipped. A file is expanded at most once per call, so
    /// import cycles terminate. Nested files that cannot be read are logged
    /// and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownLayer`] if `current_layer` is not a
    /// rank of the order, and [`ResolveError::Io`] if `file_path` itself
    /// cannot be read; in both cases no dependencies were found.
    pub fn retrieve_dependencies(
        &self,
        file_path: &Path,
        current_layer: usize,
    ) -> Result<Vec<Dependency>, ResolveError> {
        if current_layer >= self.order.len() {
            return Err(ResolveError::UnknownLayer {
                rank: current_layer,
                layers: self.order.len(),
            });
        }

        let imports = read_file_imports(file_path).map_err(|source| ResolveError::Io {
            path: file_path.to_path_buf(),
            source,
        })?;

        let mut walk = Traversal::new(file_path, current_layer);
        walk.visited.insert(canonical_key(file_path));
        self.expand(&mut walk, file_path, imports);

        while let Some(next) = walk.worklist.pop_front() {
            match read_file_imports(&next) {
                Ok(imports) => self.expand(&mut walk, &next, imports),
                Err(e) => warn!("Skipping {}: {}", next.display(), e),
            }
        }

        debug!(
            "Resolved {} internal dependencies for {} ({} files visited)",
            walk.dependencies.len(),
            file_path.display(),
            walk.visited.len()
        );

        Ok(walk.dependencies)
    }

    fn expand(&self, walk: &mut Traversal, via: &Path, imports: Vec<ImportInfo>) {
        for import in imports {
            let Some(relative) = self.module.relative_import(&import.path) else {
                continue;
            };

            walk.dependencies.push(Dependency {
                file_path: walk.start.clone(),
                file_layer: walk.start_layer,
                via: via.to_path_buf(),
                import_path: import.path.clone(),
                import_layer: self.order.classify(relative),
            });

            if !walk.packages.insert(relative.to_owned()) {
                continue;
            }

            for file in package_files(&self.module.package_dir(relative)) {
                if walk.visited.insert(canonical_key(&file)) {
                    walk.worklist.push_back(file);
                }
            }
        }
    }
}

/// Bookkeeping for one call of [`Resolver::retrieve_dependencies`].
struct Traversal {
    start: PathBuf,
    start_layer: usize,
    /// Canonical paths of files already queued or expanded.
    visited: HashSet<PathBuf>,
    /// Module-relative package paths whose files were already queued.
    packages: HashSet<String>,
    worklist: VecDeque<PathBuf>,
    dependencies: Vec<Dependency>,
}

impl Traversal {
    fn new(start: &Path, start_layer: usize) -> Self {
        Self {
            start: start.to_path_buf(),
            start_layer,
            visited: HashSet::new(),
            packages: HashSet::new(),
            worklist: VecDeque::new(),
            dependencies: Vec::new(),
        }
    }
}

fn read_file_imports(path: &Path) -> std::io::Result<Vec<ImportInfo>> {
    let file = File::open(path)?;
    Ok(read_imports(BufReader::new(file)))
}

fn canonical_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Non-test `.go` files of a package directory, sorted by name.
pub(crate) fn package_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("No package files under {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    // Links are kept even when dangling, so a broken entry is reported
    // when it is read rather than dropped here.
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| !t.is_dir()))
        .map(|entry| entry.path())
        .filter(|path| is_go_source(path))
        .collect();
    files.sort();
    files
}

/// True for `.go` files that are not `_test.go` files.
pub(crate) fn is_go_source(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| {
            name.ends_with(".go") && !name.ends_with("_test.go")
        })
}
