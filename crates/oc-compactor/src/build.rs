//! Build log aggregation into a compiled-unit count plus error blocks.

use crate::block::BlockAccumulator;
use crate::classify;
use crate::technique::Technique;
use oc_core::TechniqueKind;
use regex::Regex;
use std::sync::LazyLock;

const MAX_ERRORS_SHOWN: usize = 5;
const MAX_BLOCK_LINES: usize = 10;

static RE_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:Compiling|Checking|Building)\s+\S+").unwrap()
});
static RE_NOISE: LazyLock<Regex> = LazyLock::new(|| Regex::new(
    r"^\s*(?:Downloading|Downloaded|Fetching|Updating|Generated|Creating|Running|Finished|Locking|Adding|Blocking|Installing|Resolving|Packaging|Verifying|Fresh|Waiting)\b"
).unwrap());
// Bare diagnostics (`error[E0308]:`) or compiler-located ones (`main.c:3:5: error:`).
static RE_ERROR: LazyLock<Regex> = LazyLock::new(|| Regex::new(
    r"^\s*(?:error(?:\[[A-Za-z0-9_]+\])?:|\[ERROR\]|FAIL\b)|^\S[^:\s]*:\d+(?::\d+)?:\s*(?:fatal\s+)?error:"
).unwrap());
static RE_WARNING: LazyLock<Regex> = LazyLock::new(|| Regex::new(
    r"^\s*(?:warning(?:\[[A-Za-z0-9_]+\])?:|\[WARN(?:ING)?\]|WARN\b)|^\S[^:\s]*:\d+(?::\d+)?:\s*warning:"
).unwrap());

fn is_continuation(line: &str) -> bool {
    line.starts_with(char::is_whitespace) || line.starts_with("-->")
}

/// Scan state folded across the build log.
#[derive(Debug, Default)]
struct BuildScan {
    units: usize,
    warnings: Vec<String>,
    errors: BlockAccumulator,
}

impl BuildScan {
    fn step(mut self, line: &str) -> Self {
        if RE_UNIT.is_match(line) {
            self.units += 1;
        } else if RE_NOISE.is_match(line) {
            // progress output
        } else if RE_ERROR.is_match(line) {
            self.errors.open(line);
        } else if RE_WARNING.is_match(line) {
            self.warnings.push(line.to_string());
        } else {
            self.errors.extend(line, is_continuation);
        }
        self
    }
}

/// Summary of one build log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub units: usize,
    pub errors: Vec<Vec<String>>,
    pub warnings: Vec<String>,
}

impl BuildReport {
    pub fn scan(text: &str) -> Self {
        let scan = text.lines().fold(BuildScan::default(), BuildScan::step);
        Self { units: scan.units, errors: scan.errors.finish(), warnings: scan.warnings }
    }

    pub fn render(&self) -> String {
        if self.errors.is_empty() && self.warnings.is_empty() {
            return format!("[OK] Build successful ({} units compiled)", self.units);
        }

        let mut out = Vec::new();
        if self.errors.is_empty() {
            out.push(format!("[OK] Build successful ({} units compiled)", self.units));
        } else {
            out.push(format!("[ERROR] {} error(s):", self.errors.len()));
            for (i, block) in self.errors.iter().take(MAX_ERRORS_SHOWN).enumerate() {
                if i > 0 {
                    out.push(String::new());
                }
                out.extend(block.iter().take(MAX_BLOCK_LINES).cloned());
                if block.len() > MAX_BLOCK_LINES {
                    out.push("  ...".to_string());
                }
            }
            if self.errors.len() > MAX_ERRORS_SHOWN {
                out.push(format!("... and {} more errors", self.errors.len() - MAX_ERRORS_SHOWN));
            }
        }
        if !self.warnings.is_empty() {
            out.push(format!("[WARN] {} warning(s)", self.warnings.len()));
        }
        out.join("\n")
    }
}

/// Aggregate a build log, or `None` when `command` is not a build.
pub fn aggregate(text: &str, command: &str) -> Option<String> {
    if !classify::is_build_command(command) {
        return None;
    }
    Some(BuildReport::scan(text).render())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BuildAggregator;

impl Technique for BuildAggregator {
    fn kind(&self) -> TechniqueKind {
        TechniqueKind::BuildAggregate
    }

    fn apply(&self, text: &str, command: Option<&str>) -> Option<String> {
        aggregate(text, command?)
    }
}
