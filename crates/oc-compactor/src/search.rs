//! Search result grouping by file.

use crate::classify;
use crate::paths::compact_path;
use crate::technique::Technique;
use crate::text::truncate_chars;
use oc_core::config::SearchConfig;
use oc_core::TechniqueKind;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

const CONTENT_MAX: usize = 70;

static RE_RESULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<file>[^:\n]+):(?:(?P<line>\d+):)?(?P<content>.*)$").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub file: String,
    /// Line number as printed, `?` when the tool gave none.
    pub line: String,
    pub content: String,
}

pub fn parse_line(line: &str) -> Option<SearchResult> {
    let caps = RE_RESULT.captures(line)?;
    Some(SearchResult {
        file: caps["file"].to_string(),
        line: caps.name("line").map_or("?", |m| m.as_str()).to_string(),
        content: caps["content"].to_string(),
    })
}

/// Results grouped per file, files in lexical order.
pub fn group_results(text: &str) -> BTreeMap<String, Vec<SearchResult>> {
    let mut groups: BTreeMap<String, Vec<SearchResult>> = BTreeMap::new();
    for result in text.lines().filter_map(parse_line) {
        groups.entry(result.file.clone()).or_default().push(result);
    }
    groups
}

pub fn render(groups: &BTreeMap<String, Vec<SearchResult>>, config: &SearchConfig) -> String {
    let total: usize = groups.values().map(Vec::len).sum();
    let mut out = vec![format!("{total} matches in {} files:", groups.len())];
    let mut shown = 0;

    for (file, results) in groups {
        if shown >= config.max_results {
            break;
        }
        out.push(String::new());
        out.push(format!("> {} ({} matches):", compact_path(file), results.len()));
        let mut printed = 0;
        for result in results.iter().take(config.per_file) {
            if shown >= config.max_results {
                break;
            }
            out.push(format!("    {}: {}", result.line, truncate_chars(result.content.trim(), CONTENT_MAX)));
            printed += 1;
            shown += 1;
        }
        if results.len() > printed {
            out.push(format!("  +{} more", results.len() - printed));
        }
    }

    if shown >= config.max_results && shown < total {
        out.push(format!("... +{} more", total - shown));
    }
    out.join("\n")
}

/// Group raw search output with default caps.
pub fn group_search_results(text: &str, command: &str) -> Option<String> {
    group(text, command, &SearchConfig::default())
}

/// Group search output, or `None` when `command` is not a search or nothing
/// parsed as a result.
pub fn group(text: &str, command: &str, config: &SearchConfig) -> Option<String> {
    if !classify::is_search_command(command) {
        return None;
    }
    let groups = group_results(text);
    if groups.is_empty() {
        return None;
    }
    Some(render(&groups, config))
}

#[derive(Debug, Clone, Default)]
pub struct SearchGrouper {
    config: SearchConfig,
}

impl SearchGrouper {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }
}

impl Technique for SearchGrouper {
    fn kind(&self) -> TechniqueKind {
        TechniqueKind::SearchGroup
    }

    fn apply(&self, text: &str, command: Option<&str>) -> Option<String> {
        group(text, command?, &self.config)
    }
}
