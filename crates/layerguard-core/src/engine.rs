//! Violation checking.
//!
//! Evaluates resolved [`Dependency`] edges against the [`LayerOrder`],
//! producing at most one [`CheckResult`] per file.

use std::fmt::Write;
use std::path::Path;

use crate::layer::LayerOrder;
use crate::types::{CheckResult, Dependency, ResultType};

/// Evaluates dependency edges against the configured order.
#[derive(Debug, Clone, Copy)]
pub struct ViolationChecker<'a> {
    order: &'a LayerOrder,
}

impl<'a> ViolationChecker<'a> {
    /// Creates a checker for `order`.
    #[must_use]
    pub fn new(order: &'a LayerOrder) -> Self {
        Self { order }
    }

    /// Returns true if the edge imports a layer more central than its file's.
    #[must_use]
    pub fn is_violation(&self, dependency: &Dependency) -> bool {
        !self
            .order
            .permits(dependency.file_layer, dependency.import_layer)
    }

    /// Edges that break the order, in input order.
    #[must_use]
    pub fn violations<'d>(&self, dependencies: &'d [Dependency]) -> Vec<&'d Dependency> {
        dependencies
            .iter()
            .filter(|d| self.is_violation(d))
            .collect()
    }

    /// Aggregates a file's edges into one result.
    ///
    /// Returns a [`ResultType::Violated`] result listing every violating
    /// import, or `None` when the file is clean.
    #[must_use]
    pub fn check_file(&self, file: &Path, dependencies: &[Dependency]) -> Option<CheckResult> {
        let violations = self.violations(dependencies);
        if violations.is_empty() {
            return None;
        }

        let mut message = String::new();
        for (i, d) in violations.iter().enumerate() {
            if i > 0 {
                message.push('\n');
            }
            let _ = write!(message, "{} imports {}", file.display(), d.import_path);
            if !d.is_direct() {
                let _ = write!(message, " (via {})", d.via.display());
            }
            let _ = write!(
                message,
                "\n => {} depends on {}",
                self.layer_name(Some(d.file_layer)),
                self.layer_name(d.import_layer)
            );
        }

        Some(CheckResult::new(ResultType::Violated, file, message))
    }

    /// Explicit result for a file that respects the order.
    #[must_use]
    pub fn verified(file: &Path) -> CheckResult {
        CheckResult::new(ResultType::Verified, file, file.display().to_string())
    }

    fn layer_name(&self, rank: Option<usize>) -> &str {
        rank.and_then(|r| self.order.name(r)).unwrap_or("unordered")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;
    use std::path::PathBuf;

    fn order() -> LayerOrder {
        LayerOrder::new(["external", "adapter", "application", "domain"]).unwrap()
    }

    fn dep(file_layer: usize, import: &str, import_layer: Option<usize>) -> Dependency {
        Dependency {
            file_path: PathBuf::from("app/application/svc.go"),
            file_layer,
            via: PathBuf::from("app/application/svc.go"),
            import_path: format!("\"example.com/app/{import}\""),
            import_layer,
        }
    }

    #[test]
    fn inward_import_is_allowed() {
        let o = order();
        let c = ViolationChecker::new(&o);
        assert!(!c.is_violation(&dep(2, "domain", Some(3))));
        assert!(!c.is_violation(&dep(2, "application/other", Some(2))));
    }

    #[test]
    fn outward_import_is_violation() {
        let o = order();
        let c = ViolationChecker::new(&o);
        assert!(c.is_violation(&dep(2, "adapter", Some(1))));
    }

    #[test]
    fn unordered_target_never_violates() {
        let o = order();
        let c = ViolationChecker::new(&o);
        assert!(!c.is_violation(&dep(3, "pkg/util", None)));
    }

    #[test]
    fn clean_file_has_no_result() {
        let o = order();
        let c = ViolationChecker::new(&o);
        let deps = vec![dep(2, "domain", Some(3))];
        assert!(c.check_file(Path::new("app/application/svc.go"), &deps).is_none());
        assert!(c.check_file(Path::new("app/application/svc.go"), &[]).is_none());
    }

    #[test]
    fn several_violations_yield_one_result() {
        let o = order();
        let c = ViolationChecker::new(&o);
        let deps = vec![
            dep(2, "adapter", Some(1)),
            dep(2, "domain", Some(3)),
            dep(2, "external", Some(0)),
        ];
        let r = c
            .check_file(Path::new("app/application/svc.go"), &deps)
            .expect("violation expected");
        assert_eq!(r.result_type, ResultType::Violated);
        assert_eq!(r.color, Color::Red);
        insta::assert_snapshot!(r.message, @r###"
        app/application/svc.go imports "example.com/app/adapter"
         => application depends on adapter
        app/application/svc.go imports "example.com/app/external"
         => application depends on external
        "###);
    }

    #[test]
    fn transitive_violation_names_the_declaring_file() {
        let o = order();
        let c = ViolationChecker::new(&o);
        let mut d = dep(0, "external", Some(0));
        d.file_layer = 1;
        d.via = PathBuf::from("app/pkg/util/util.go");
        let r = c
            .check_file(Path::new("app/application/svc.go"), &[d])
            .expect("violation expected");
        assert!(r.message.contains("(via app/pkg/util/util.go)"));
        assert!(r.message.contains("adapter depends on external"));
    }

    #[test]
    fn verified_result_is_green() {
        let r = ViolationChecker::verified(Path::new("domain/user.go"));
        assert_eq!(r.result_type, ResultType::Verified);
        assert_eq!(r.color, Color::Green);
        assert_eq!(r.message, "domain/user.go");
    }
}
