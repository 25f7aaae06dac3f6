use serde::{Deserialize, Serialize};
use std::fmt;

/// A single compaction technique the engine can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechniqueKind {
    AnsiStrip,
    BuildAggregate,
    TestAggregate,
    GitCompact,
    LintAggregate,
    Truncate,
    SourceFilter,
    SmartTruncate,
    SearchGroup,
}

impl TechniqueKind {
    pub const ALL: [TechniqueKind; 9] = [
        Self::AnsiStrip,
        Self::BuildAggregate,
        Self::TestAggregate,
        Self::GitCompact,
        Self::LintAggregate,
        Self::Truncate,
        Self::SourceFilter,
        Self::SmartTruncate,
        Self::SearchGroup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnsiStrip => "ansi_strip",
            Self::BuildAggregate => "build_aggregate",
            Self::TestAggregate => "test_aggregate",
            Self::GitCompact => "git_compact",
            Self::LintAggregate => "lint_aggregate",
            Self::Truncate => "truncate",
            Self::SourceFilter => "source_filter",
            Self::SmartTruncate => "smart_truncate",
            Self::SearchGroup => "search_group",
        }
    }
}

impl fmt::Display for TechniqueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source filtering level for file reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterLevel {
    None,
    #[default]
    Minimal,
    Aggressive,
}

impl FilterLevel {
    /// Parse a level name, case-insensitively. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Some(Self::None),
            "minimal" => Some(Self::Minimal),
            "aggressive" => Some(Self::Aggressive),
            _ => None,
        }
    }
}

/// Which dispatcher path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    CommandOutput,
    FileRead,
    SearchResult,
}
