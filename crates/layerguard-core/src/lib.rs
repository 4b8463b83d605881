//! # layerguard-core
//!
//! Layered-architecture dependency checking for Go source trees.
//!
//! Files belong to layers by directory name. A configured order ranks the
//! layers, and a file may only import packages from its own rank or a
//! higher one. The crate provides:
//!
//! - [`extractor`]: a line-oriented import scanner for Go files
//! - [`LayerOrder`] for path-to-layer classification
//! - [`Module`] for telling internal imports from external ones
//! - [`Resolver`] for the transitive closure of a file's internal imports
//! - [`ViolationChecker`] for turning edges into per-file results
//! - [`Checker`] for walking a target and collecting [`CheckResult`]s
//!
//! ## Example
//!
//! ```ignore
//! use layerguard_core::{check, Config};
//!
//! let config = Config {
//!     dependency_orders: vec!["external".into(), "adapter".into(), "domain".into()],
//!     ..Config::for_target("./internal")
//! };
//! for result in check(config)? {
//!     println!("{result}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod checker;
pub mod config;
pub mod engine;
pub mod extractor;
pub mod layer;
pub mod module;
pub mod resolver;
mod types;
pub mod walker;

pub use checker::{check, Checker};
pub use config::{Config, ConfigError};
pub use engine::ViolationChecker;
pub use extractor::{parse_imports, read_imports, ImportInfo};
pub use layer::LayerOrder;
pub use module::Module;
pub use resolver::{ResolveError, Resolver};
pub use types::{CheckReport, CheckResult, Color, Dependency, ResultType};
pub use walker::{IgnoreMatcher, WalkSignal};
