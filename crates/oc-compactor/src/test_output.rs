//! Test run aggregation: pass/fail/skip counts plus captured failures.

use crate::block::BlockAccumulator;
use crate::classify;
use crate::technique::Technique;
use crate::text::truncate_chars;
use oc_core::TechniqueKind;
use regex::{Captures, Regex};
use std::sync::LazyLock;

const MAX_FAILURES_SHOWN: usize = 5;
const FIRST_LINE_MAX: usize = 70;
const DETAIL_LINE_MAX: usize = 65;
const DETAIL_LINES: usize = 3;

/// A runner summary regex and the capture group holding each count.
struct SummaryPattern {
    re: Regex,
    passed: usize,
    failed: Option<usize>,
    skipped: Option<usize>,
}

impl SummaryPattern {
    fn new(pattern: &str, passed: usize, failed: Option<usize>, skipped: Option<usize>) -> Self {
        Self { re: Regex::new(pattern).unwrap(), passed, failed, skipped }
    }

    fn extract(&self, text: &str) -> Option<TestCounts> {
        let caps = self.re.captures(text)?;
        let group = |idx: Option<usize>| idx.map_or(0, |i| count(&caps, i));
        Some(TestCounts {
            passed: count(&caps, self.passed),
            failed: group(self.failed),
            skipped: group(self.skipped),
        })
    }
}

fn count(caps: &Captures<'_>, idx: usize) -> usize {
    caps.get(idx).and_then(|m| m.as_str().parse().ok()).unwrap_or(0)
}

static SUMMARY_PATTERNS: LazyLock<Vec<SummaryPattern>> = LazyLock::new(|| vec![
    // cargo test
    SummaryPattern::new(
        r"test result: \w+\. (\d+) passed; (\d+) failed;(?: (\d+) ignored;)?",
        1, Some(2), Some(3),
    ),
    // jest
    SummaryPattern::new(
        r"Tests:\s+(?:(\d+) failed, )?(?:(\d+) skipped, )?(?:\d+ todo, )?(\d+) passed",
        3, Some(1), Some(2),
    ),
    // vitest
    SummaryPattern::new(
        r"Tests\s+(?:(\d+) failed \| )?(\d+) passed(?: \| (\d+) skipped)?",
        2, Some(1), Some(3),
    ),
    // mocha
    SummaryPattern::new(
        r"(\d+) passing[^\n]*(?:\s+(\d+) pending[^\n]*)?(?:\s+(\d+) failing)?",
        1, Some(3), Some(2),
    ),
    // pytest and friends
    SummaryPattern::new(
        r"(?:(\d+) failed,\s*)?(\d+) passed(?:,\s*(\d+) skipped)?",
        2, Some(1), Some(3),
    ),
]);

static RE_PASS_MARK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:ok|PASS|PASSED)\b|[✓✔]").unwrap()
});
static RE_FAIL_MARK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:FAIL|FAILED|fail)\b|[✗✘✕×]").unwrap()
});
static RE_FAILURE_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(
    r"^\s*(?:FAIL\s|FAILED\s|[●•✕✗✘×]\s|test .+ \.\.\. FAILED|thread '.+' panicked)"
).unwrap());

fn is_continuation(line: &str) -> bool {
    line.starts_with(char::is_whitespace) || line.starts_with('-')
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestCounts {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl TestCounts {
    /// First matching runner summary, or zeros.
    pub fn from_summary(text: &str) -> Self {
        SUMMARY_PATTERNS.iter().find_map(|p| p.extract(text)).unwrap_or_default()
    }

    /// Per-line pass/fail marker count; a line counts at most once.
    pub fn from_markers(text: &str) -> Self {
        text.lines().fold(Self::default(), |mut acc, line| {
            if RE_FAIL_MARK.is_match(line) {
                acc.failed += 1;
            } else if RE_PASS_MARK.is_match(line) {
                acc.passed += 1;
            }
            acc
        })
    }

    pub fn is_empty(&self) -> bool {
        self.passed == 0 && self.failed == 0 && self.skipped == 0
    }
}

pub fn collect_failures(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .fold(BlockAccumulator::default(), |mut acc, line| {
            if RE_FAILURE_START.is_match(line) {
                acc.open(line);
            } else {
                acc.extend(line, is_continuation);
            }
            acc
        })
        .finish()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReport {
    pub counts: TestCounts,
    pub failures: Vec<Vec<String>>,
}

impl TestReport {
    pub fn scan(text: &str) -> Self {
        let mut counts = TestCounts::from_summary(text);
        if counts.passed == 0 && counts.failed == 0 {
            let marked = TestCounts::from_markers(text);
            counts.passed = marked.passed;
            counts.failed = marked.failed;
        }
        let failures = if counts.failed > 0 { collect_failures(text) } else { Vec::new() };
        Self { counts, failures }
    }

    pub fn render(&self) -> String {
        let c = &self.counts;
        let mut out = vec!["Test Results:".to_string(), format!("   PASS: {} passed", c.passed)];
        if c.failed > 0 {
            out.push(format!("   FAIL: {} failed", c.failed));
        }
        if c.skipped > 0 {
            out.push(format!("   SKIP: {} skipped", c.skipped));
        }
        if c.failed > 0 && !self.failures.is_empty() {
            out.push("\n   Failures:".to_string());
            for failure in self.failures.iter().take(MAX_FAILURES_SHOWN) {
                out.push(format!("   - {}", truncate_chars(failure[0].trim(), FIRST_LINE_MAX)));
                for line in failure.iter().skip(1).take(DETAIL_LINES) {
                    out.push(format!("     {}", truncate_chars(line.trim(), DETAIL_LINE_MAX)));
                }
                if failure.len() > DETAIL_LINES + 1 {
                    out.push(format!("     ... ({} more lines)", failure.len() - DETAIL_LINES - 1));
                }
            }
            if self.failures.len() > MAX_FAILURES_SHOWN {
                out.push(format!("   ... and {} more failures", self.failures.len() - MAX_FAILURES_SHOWN));
            }
        }
        out.join("\n")
    }
}

/// Aggregate test output, or `None` when `command` runs no known test runner
/// or no counts could be recovered.
pub fn aggregate(text: &str, command: &str) -> Option<String> {
    if !classify::is_test_command(command) {
        return None;
    }
    let report = TestReport::scan(text);
    if report.counts.is_empty() {
        tracing::trace!(command, "no test counts recovered");
        return None;
    }
    Some(report.render())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TestAggregator;

impl Technique for TestAggregator {
    fn kind(&self) -> TechniqueKind {
        TechniqueKind::TestAggregate
    }

    fn apply(&self, text: &str, command: Option<&str>) -> Option<String> {
        aggregate(text, command?)
    }
}
