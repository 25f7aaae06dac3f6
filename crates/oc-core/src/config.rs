use crate::error::{ConfigError, Result};
use crate::types::{FilterLevel, TechniqueKind};
use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration. Read-only per call; toggles return a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub enabled: bool,
    pub techniques: TechniqueToggles,
    pub truncation: TruncationConfig,
    pub source: SourceConfig,
    pub git: GitConfig,
    pub search: SearchConfig,
}

/// Per-technique enable flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechniqueToggles {
    pub ansi_strip: bool,
    pub build_aggregate: bool,
    pub test_aggregate: bool,
    pub git_compact: bool,
    pub lint_aggregate: bool,
    pub truncate: bool,
    pub source_filter: bool,
    pub smart_truncate: bool,
    pub search_group: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruncationConfig {
    /// Character budget for command output.
    pub max_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub level: FilterLevel,
    /// Line budget for smart truncation of file reads.
    pub max_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    pub diff_max_lines: usize,
    pub hunk_max_lines: usize,
    pub log_limit: usize,
    pub status_max_files: usize,
    pub status_max_untracked: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_results: usize,
    pub per_file: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            techniques: TechniqueToggles::default(),
            truncation: TruncationConfig::default(),
            source: SourceConfig::default(),
            git: GitConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for TechniqueToggles {
    fn default() -> Self {
        Self {
            ansi_strip: true,
            build_aggregate: true,
            test_aggregate: true,
            git_compact: true,
            lint_aggregate: true,
            truncate: true,
            source_filter: true,
            smart_truncate: true,
            search_group: true,
        }
    }
}

impl Default for TruncationConfig {
    fn default() -> Self {
        Self { max_chars: 10_000 }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { level: FilterLevel::Minimal, max_lines: 200 }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            diff_max_lines: 50,
            hunk_max_lines: 10,
            log_limit: 20,
            status_max_files: 5,
            status_max_untracked: 3,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_results: 50, per_file: 10 }
    }
}

impl TechniqueToggles {
    pub fn get(&self, kind: TechniqueKind) -> bool {
        match kind {
            TechniqueKind::AnsiStrip => self.ansi_strip,
            TechniqueKind::BuildAggregate => self.build_aggregate,
            TechniqueKind::TestAggregate => self.test_aggregate,
            TechniqueKind::GitCompact => self.git_compact,
            TechniqueKind::LintAggregate => self.lint_aggregate,
            TechniqueKind::Truncate => self.truncate,
            TechniqueKind::SourceFilter => self.source_filter,
            TechniqueKind::SmartTruncate => self.smart_truncate,
            TechniqueKind::SearchGroup => self.search_group,
        }
    }

    fn slot(&mut self, kind: TechniqueKind) -> &mut bool {
        match kind {
            TechniqueKind::AnsiStrip => &mut self.ansi_strip,
            TechniqueKind::BuildAggregate => &mut self.build_aggregate,
            TechniqueKind::TestAggregate => &mut self.test_aggregate,
            TechniqueKind::GitCompact => &mut self.git_compact,
            TechniqueKind::LintAggregate => &mut self.lint_aggregate,
            TechniqueKind::Truncate => &mut self.truncate,
            TechniqueKind::SourceFilter => &mut self.source_filter,
            TechniqueKind::SmartTruncate => &mut self.smart_truncate,
            TechniqueKind::SearchGroup => &mut self.search_group,
        }
    }
}

impl EngineConfig {
    /// Whether a technique may run under this configuration.
    pub fn is_enabled(&self, kind: TechniqueKind) -> bool {
        self.enabled && self.techniques.get(kind)
    }

    pub fn with_enabled(&self, enabled: bool) -> Self {
        Self { enabled, ..self.clone() }
    }

    pub fn with_technique(&self, kind: TechniqueKind, enabled: bool) -> Self {
        let mut next = self.clone();
        *next.techniques.slot(kind) = enabled;
        next
    }

    pub fn with_source_level(&self, level: FilterLevel) -> Self {
        let mut next = self.clone();
        next.source.level = level;
        next
    }

    /// Reject budgets that would make a technique emit nothing useful.
    pub fn validate(&self) -> Result<()> {
        let budgets = [
            ("truncation.max_chars", self.truncation.max_chars),
            ("source.max_lines", self.source.max_lines),
            ("git.diff_max_lines", self.git.diff_max_lines),
            ("git.hunk_max_lines", self.git.hunk_max_lines),
            ("git.log_limit", self.git.log_limit),
            ("search.max_results", self.search.max_results),
            ("search.per_file", self.search.per_file),
        ];
        for (name, value) in budgets {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
            }
        }
        Ok(())
    }

    /// Parse a (possibly partial) JSON document; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(ConfigError::from)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Load a config file, falling back to defaults on any failure.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(err) => {
                let detail = format!("{err:#}");
                tracing::warn!(error = %detail, "config unusable, using defaults");
                Self::default()
            }
        }
    }
}
