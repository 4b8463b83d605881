//! Shared output formatting for check results.

use anyhow::Result;
use layerguard_core::{CheckReport, CheckResult, ResultType};

use crate::OutputFormat;

const RESET: &str = "\x1b[0m";

/// Print check results in the specified format.
pub fn print(report: &CheckReport, format: OutputFormat, violations_at_bottom: bool) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report, violations_at_bottom),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

/// Results in display order: traversal order, or with violations moved
/// after everything else when `violations_at_bottom` is set.
fn ordered(results: &[CheckResult], violations_at_bottom: bool) -> Vec<&CheckResult> {
    if !violations_at_bottom {
        return results.iter().collect();
    }
    let (violations, others): (Vec<&CheckResult>, Vec<&CheckResult>) =
        results.iter().partition(|r| r.is_violation());
    others.into_iter().chain(violations).collect()
}

fn render_text(result: &CheckResult) -> String {
    format!(
        "{}[{}]{} {}",
        result.color.ansi(),
        result.result_type,
        RESET,
        result.message
    )
}

fn print_text(report: &CheckReport, violations_at_bottom: bool) {
    for result in ordered(&report.results, violations_at_bottom) {
        println!("{}", render_text(result));
    }

    let violations = report.count(ResultType::Violated);
    let warnings = report.count(ResultType::Warning);

    let summary_color = if violations > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    if !report.results.is_empty() {
        println!();
    }
    println!(
        "{}Found {} violation(s), {} warning(s) in {} file(s){}",
        summary_color, violations, warnings, report.files_checked, RESET
    );
}

fn print_json(report: &CheckReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn render_compact(result: &CheckResult) -> String {
    let first_line = result.message.lines().next().unwrap_or_default();
    format!(
        "{}: {} {}",
        result.path.display(),
        result.result_type.to_string().to_lowercase(),
        first_line
    )
}

fn print_compact(report: &CheckReport) {
    for result in &report.results {
        println!("{}", render_compact(result));
    }
}
