//! Git output compaction for `diff`, `status` and `log`.

use crate::classify;
use crate::technique::Technique;
use crate::text::truncate_chars;
use oc_core::config::GitConfig;
use oc_core::TechniqueKind;
use regex::Regex;
use std::sync::LazyLock;

const LOG_LINE_MAX: usize = 80;

static RE_PORCELAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[ MADRCUT?!]{2} \S|## )").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcommand {
    Diff,
    Status,
    Log,
    Other,
}

/// Subcommand of a `git ...` command line, skipping global options.
pub fn subcommand(command: &str) -> Option<Subcommand> {
    if !classify::is_git_command(command) {
        return None;
    }
    let mut parts = command.split_whitespace().skip(1);
    while let Some(part) = parts.next() {
        match part {
            "-C" | "-c" | "--git-dir" | "--work-tree" | "--namespace" => {
                parts.next();
            }
            p if p.starts_with('-') => {}
            "diff" => return Some(Subcommand::Diff),
            "status" => return Some(Subcommand::Status),
            "log" => return Some(Subcommand::Log),
            _ => return Some(Subcommand::Other),
        }
    }
    None
}

/// Diff scan state.
struct DiffScan<'a> {
    max_lines: usize,
    hunk_max: usize,
    out: Vec<String>,
    file: Option<&'a str>,
    added: usize,
    removed: usize,
    hunk_lines: usize,
    in_hunk: bool,
    truncated: bool,
}

impl<'a> DiffScan<'a> {
    /// Appends within the line budget; a dropped line marks the scan truncated.
    fn push(&mut self, line: String) {
        if self.out.len() < self.max_lines {
            self.out.push(line);
        } else {
            self.truncated = true;
        }
    }

    fn stats(&self) -> Option<String> {
        self.file.map(|_| format!("  +{} -{}", self.added, self.removed))
    }

    fn emit_hunk_line(&mut self, line: &str) {
        if self.hunk_lines < self.hunk_max {
            self.push(format!("  {line}"));
        } else if self.hunk_lines == self.hunk_max {
            self.push("  ... (truncated)".to_string());
        } else {
            return;
        }
        self.hunk_lines += 1;
    }

    fn step(&mut self, line: &'a str) {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            if let Some(stats) = self.stats() {
                self.push(stats);
            }
            let file = rest.split_once(" b/").map_or(rest, |(_, b)| b);
            self.file = Some(file);
            self.push(file.to_string());
            self.added = 0;
            self.removed = 0;
            self.in_hunk = false;
        } else if line.starts_with("@@") {
            self.in_hunk = true;
            self.hunk_lines = 0;
            self.push(format!("  {line}"));
        } else if self.in_hunk {
            if line.starts_with('+') && !line.starts_with("+++") {
                self.added += 1;
                self.emit_hunk_line(line);
            } else if line.starts_with('-') && !line.starts_with("---") {
                self.removed += 1;
                self.emit_hunk_line(line);
            } else if self.hunk_lines > 0 && !line.starts_with('\\') {
                self.emit_hunk_line(line);
            }
        }
    }

    /// Closes the report with the last file's counts. When input was dropped,
    /// the body is cut so that it plus the marker and counts fit `max_lines`.
    fn finish(mut self) -> String {
        let stats = self.stats();
        if self.truncated {
            let room = self.max_lines.saturating_sub(1 + usize::from(stats.is_some()));
            self.out.truncate(room);
            self.out.push("... (more changes truncated)".to_string());
        }
        self.out.extend(stats);
        self.out.join("\n")
    }
}

/// Per-file change counts plus the first lines of each hunk.
pub fn compact_diff(text: &str, max_lines: usize, hunk_max: usize) -> String {
    let mut scan = DiffScan {
        max_lines,
        hunk_max,
        out: Vec::new(),
        file: None,
        added: 0,
        removed: 0,
        hunk_lines: 0,
        in_hunk: false,
        truncated: false,
    };
    for line in text.lines() {
        scan.step(line);
        if scan.truncated {
            break;
        }
    }
    scan.finish()
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct StatusBuckets {
    pub branch: Option<String>,
    pub staged: Vec<String>,
    pub modified: Vec<String>,
    pub untracked: Vec<String>,
    pub conflicts: Vec<String>,
}

impl StatusBuckets {
    pub fn parse(text: &str) -> Self {
        let mut buckets = Self::default();
        for line in text.lines() {
            if let Some(rest) = line.strip_prefix("##") {
                if buckets.branch.is_none() {
                    let rest = rest.trim();
                    let name = rest.split_once("...").map_or(rest, |(b, _)| b);
                    buckets.branch = Some(name.trim().to_string());
                }
                continue;
            }
            let (Some(code), Some(file)) = (line.get(..2), line.get(3..)) else {
                continue;
            };
            let file = file.to_string();
            let mut chars = code.chars();
            let (x, y) = (chars.next().unwrap_or(' '), chars.next().unwrap_or(' '));
            if code == "??" {
                buckets.untracked.push(file);
                continue;
            }
            if x == 'U' || y == 'U' {
                buckets.conflicts.push(file);
                continue;
            }
            if matches!(x, 'M' | 'A' | 'D' | 'R' | 'C') {
                buckets.staged.push(file.clone());
            }
            if matches!(y, 'M' | 'D') {
                buckets.modified.push(file);
            }
        }
        buckets
    }

    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.modified.is_empty() && self.untracked.is_empty() && self.conflicts.is_empty()
    }
}

fn push_bucket(out: &mut Vec<String>, title: &str, files: &[String], cap: usize) {
    if files.is_empty() {
        return;
    }
    out.push(format!("{title}: {} files", files.len()));
    for file in files.iter().take(cap) {
        out.push(format!("   {file}"));
    }
    if files.len() > cap {
        out.push(format!("   ... +{} more", files.len() - cap));
    }
}

/// Bucketed porcelain status with default caps.
pub fn compact_status(text: &str) -> String {
    let defaults = GitConfig::default();
    compact_status_with(text, defaults.status_max_files, defaults.status_max_untracked)
}

pub fn compact_status_with(text: &str, max_files: usize, max_untracked: usize) -> String {
    let buckets = StatusBuckets::parse(text);
    let mut out = Vec::new();
    if let Some(branch) = &buckets.branch {
        out.push(format!("Branch: {branch}"));
    }
    if buckets.is_clean() {
        out.push("Clean working tree".to_string());
        return out.join("\n");
    }
    push_bucket(&mut out, "Staged", &buckets.staged, max_files);
    push_bucket(&mut out, "Modified", &buckets.modified, max_files);
    push_bucket(&mut out, "Untracked", &buckets.untracked, max_untracked);
    if !buckets.conflicts.is_empty() {
        out.push(format!(
            "[WARN] {} conflict(s): {}",
            buckets.conflicts.len(),
            buckets.conflicts.join(", ")
        ));
    }
    out.join("\n")
}

/// Whether every non-blank line is a porcelain entry or branch header.
pub fn is_porcelain(text: &str) -> bool {
    text.lines().filter(|l| !l.trim().is_empty()).all(|l| RE_PORCELAIN.is_match(l))
}

pub fn compact_log(text: &str, limit: usize) -> String {
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let mut out: Vec<String> = lines.iter().take(limit).map(|l| truncate_chars(l, LOG_LINE_MAX)).collect();
    if lines.len() > limit {
        out.push(format!("... and {} more commits", lines.len() - limit));
    }
    out.join("\n")
}

/// Compact git output for supported subcommands.
pub fn compact(text: &str, command: &str, config: &GitConfig) -> Option<String> {
    match subcommand(command)? {
        Subcommand::Diff if !text.trim().is_empty() => {
            Some(compact_diff(text, config.diff_max_lines, config.hunk_max_lines))
        }
        Subcommand::Status if is_porcelain(text) => {
            Some(compact_status_with(text, config.status_max_files, config.status_max_untracked))
        }
        Subcommand::Log => Some(compact_log(text, config.log_limit)),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct GitCompactor {
    config: GitConfig,
}

impl GitCompactor {
    pub fn new(config: GitConfig) -> Self {
        Self { config }
    }
}

impl Technique for GitCompactor {
    fn kind(&self) -> TechniqueKind {
        TechniqueKind::GitCompact
    }

    fn apply(&self, text: &str, command: Option<&str>) -> Option<String> {
        compact(text, command?, &self.config)
    }
}
