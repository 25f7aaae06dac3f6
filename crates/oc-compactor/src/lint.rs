//! Linter output aggregation by rule and by file.

use crate::classify;
use crate::paths::compact_path;
use crate::technique::Technique;
use crate::text::rank_counts;
use oc_core::TechniqueKind;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

const TOP_RULES: usize = 10;
const TOP_FILES: usize = 10;
const RULES_PER_FILE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub rule: String,
    pub file: String,
    pub line: Option<u32>,
    pub message: String,
}

type Shape = (Regex, fn(&Captures<'_>) -> Issue);

// `file:line:col: message`, then `severity: message at file:line:col`.
static SHAPES: LazyLock<Vec<Shape>> = LazyLock::new(|| vec![
    (
        Regex::new(r"^(?P<file>[^\s:][^:]*):(?P<line>\d+):(?P<col>\d+):?\s*(?P<msg>.+)$").unwrap(),
        issue_from_location as fn(&Captures<'_>) -> Issue,
    ),
    (
        Regex::new(r"(?i)^\s*(?P<sev>error|warning|warn):?\s+(?P<msg>.+?)\s+at\s+(?P<file>[^\s:]+):(?P<line>\d+)(?::(?P<col>\d+))?\s*$").unwrap(),
        issue_from_severity,
    ),
]);

static RE_RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\[\]\s]+)\]\s*$").unwrap());

/// Trailing `[rule]` of a message; ESLint-unix `[Error/rule]` also yields severity.
fn split_rule(message: &str) -> (String, Option<Severity>) {
    let Some(caps) = RE_RULE.captures(message) else {
        return ("unknown".to_string(), None);
    };
    let raw = &caps[1];
    match raw.split_once('/') {
        Some(("Error", rule)) => (rule.to_string(), Some(Severity::Error)),
        Some(("Warning", rule)) => (rule.to_string(), Some(Severity::Warning)),
        _ => (raw.to_string(), None),
    }
}

fn issue_from_location(caps: &Captures<'_>) -> Issue {
    let message = caps["msg"].trim().to_string();
    let (rule, tagged) = split_rule(&message);
    let severity = tagged.unwrap_or_else(|| {
        if message.to_ascii_lowercase().starts_with("warning") {
            Severity::Warning
        } else {
            Severity::Error
        }
    });
    Issue {
        severity,
        rule,
        file: caps["file"].to_string(),
        line: caps["line"].parse().ok(),
        message,
    }
}

fn issue_from_severity(caps: &Captures<'_>) -> Issue {
    let message = caps["msg"].trim().to_string();
    let (rule, _) = split_rule(&message);
    let severity = if caps["sev"].eq_ignore_ascii_case("error") { Severity::Error } else { Severity::Warning };
    Issue {
        severity,
        rule,
        file: caps["file"].to_string(),
        line: caps["line"].parse().ok(),
        message,
    }
}

/// First matching shape wins; unrecognized lines yield `None`.
pub fn parse_line(line: &str) -> Option<Issue> {
    SHAPES.iter().find_map(|(re, build)| re.captures(line).map(|caps| build(&caps)))
}

pub fn parse_issues(text: &str) -> Vec<Issue> {
    text.lines().filter_map(parse_line).collect()
}

pub fn render(label: &str, issues: &[Issue]) -> String {
    if issues.is_empty() {
        return format!("[OK] {label}: No issues found");
    }

    let errors = issues.iter().filter(|i| i.severity == Severity::Error).count();
    let warnings = issues.len() - errors;

    let mut rule_counts: HashMap<&str, usize> = HashMap::new();
    let mut by_file: HashMap<&str, HashMap<&str, usize>> = HashMap::new();
    for issue in issues {
        *rule_counts.entry(issue.rule.as_str()).or_insert(0) += 1;
        *by_file
            .entry(issue.file.as_str())
            .or_default()
            .entry(issue.rule.as_str())
            .or_insert(0) += 1;
    }

    let mut out = vec![format!(
        "{label}: {} errors, {} warnings in {} files",
        errors,
        warnings,
        by_file.len()
    )];

    out.push(String::new());
    out.push("Top rules:".to_string());
    for (rule, n) in rank_counts(rule_counts.into_iter().collect()).into_iter().take(TOP_RULES) {
        out.push(format!("  {rule} ({n}x)"));
    }

    let file_totals: Vec<(&str, usize)> =
        by_file.iter().map(|(file, rules)| (*file, rules.values().sum())).collect();

    out.push(String::new());
    out.push("Top files:".to_string());
    for (file, n) in rank_counts(file_totals).into_iter().take(TOP_FILES) {
        out.push(format!("  {} ({n} issues)", compact_path(file)));
        let rules: Vec<(&str, usize)> = by_file[file].iter().map(|(r, c)| (*r, *c)).collect();
        let top: Vec<String> = rank_counts(rules)
            .into_iter()
            .take(RULES_PER_FILE)
            .map(|(rule, c)| format!("{rule} ({c})"))
            .collect();
        out.push(format!("    {}", top.join(", ")));
    }

    out.join("\n")
}

/// Aggregate linter output, or `None` when `command` names no known linter.
pub fn aggregate(text: &str, command: &str) -> Option<String> {
    let label = classify::linter_label(command)?;
    Some(render(label, &parse_issues(text)))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LintAggregator;

impl Technique for LintAggregator {
    fn kind(&self) -> TechniqueKind {
        TechniqueKind::LintAggregate
    }

    fn apply(&self, text: &str, command: Option<&str>) -> Option<String> {
        aggregate(text, command?)
    }
}
