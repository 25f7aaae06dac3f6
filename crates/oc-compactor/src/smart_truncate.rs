//! Line-budget truncation that favors structural lines.
//!
//! Imports, declarations and exported items survive anywhere in the file;
//! ordinary lines are kept only while the first half of the budget lasts.
//! Each run of dropped lines is announced by one marker in front of the
//! next kept line, and a closing summary reports what was left out.

use crate::language::Language;
use crate::source_filter::{is_signature, RE_IMPORT};
use crate::technique::Technique;
use oc_core::TechniqueKind;
use regex::Regex;
use std::sync::LazyLock;

static RE_EXPORTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:pub|export|public)\b").unwrap()
});

fn is_important(line: &str, lang: Option<Language>) -> bool {
    RE_IMPORT.is_match(line) || is_signature(line, lang) || RE_EXPORTED.is_match(line)
}

/// Truncate `content` to at most `max_lines` lines, or `None` when it already
/// fits.
pub fn smart_truncate(content: &str, max_lines: usize, lang: Option<Language>) -> Option<String> {
    let lines: Vec<&str> = content.lines().collect();
    let total = lines.len();
    if total <= max_lines || max_lines == 0 {
        return None;
    }

    // one line is reserved for the summary
    let budget = max_lines - 1;
    let ordinary_quota = max_lines / 2;
    let mut out: Vec<String> = Vec::with_capacity(max_lines);
    let mut kept = 0;
    let mut dropped_run = 0;

    for line in lines {
        if out.len() >= budget {
            break;
        }
        if !is_important(line, lang) && kept >= ordinary_quota {
            dropped_run += 1;
            continue;
        }
        if dropped_run > 0 {
            if out.len() + 2 > budget {
                break;
            }
            out.push(format!("    // ... {dropped_run} lines omitted"));
            dropped_run = 0;
        }
        out.push(line.to_string());
        kept += 1;
    }

    out.push(format!("// ... {} more lines (total: {total})", total - kept));
    tracing::trace!(total, kept, max_lines, "smart truncation");
    Some(out.join("\n"))
}

#[derive(Debug, Clone, Copy)]
pub struct SmartTruncator {
    max_lines: usize,
    lang: Option<Language>,
}

impl SmartTruncator {
    pub fn new(max_lines: usize, lang: Option<Language>) -> Self {
        Self { max_lines, lang }
    }

    pub fn for_path(max_lines: usize, path: &str) -> Self {
        Self::new(max_lines, Language::from_path(path))
    }
}

impl Technique for SmartTruncator {
    fn kind(&self) -> TechniqueKind {
        TechniqueKind::SmartTruncate
    }

    fn apply(&self, text: &str, _command: Option<&str>) -> Option<String> {
        smart_truncate(text, self.max_lines, self.lang)
    }
}
