//! Line-based source filtering: comment stripping (minimal) and
//! signature-only views (aggressive).

use crate::language::{CommentPatterns, Language};
use crate::technique::Technique;
use crate::text::is_blank;
use oc_core::{FilterLevel, TechniqueKind};
use regex::Regex;
use std::sync::LazyLock;

const IMPLEMENTATION_PLACEHOLDER: &str = "    // ... implementation";
const MAX_BLANK_RUN: usize = 2;

pub(crate) static RE_IMPORT: LazyLock<Regex> = LazyLock::new(|| Regex::new(
    r#"^\s*(?:use\s+\S|import\s|from\s+\S+\s+import\s|#\s*include\b|#import\b|require\(|(?:const|let|var)\s+\w+\s*=\s*require\(|package\s+[\w.]+|extern\s+crate\s|using\s+[\w.]+\s*;|mod\s+\w+\s*;)"#
).unwrap());

pub(crate) static RE_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| Regex::new(concat!(
    r#"^\s*(?:(?:pub(?:\([^)]*\))?|export|default|public|private|protected|internal|static|abstract|final|sealed|open|override|virtual|async|unsafe|extern(?:\s+"[^"]*")?|const|inline|suspend|data)\s+)*"#,
    r"(?:fn|fun|func|function\*?|def|class|struct|enum|trait|interface|type|impl|union|object|record|module|protocol)(?:\s+[\w$(*]|<)",
)).unwrap());

// `[modifiers] Type name(params) [{]` for languages without a declaration keyword.
static RE_TYPED_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| Regex::new(
    r"^\s*(?P<first>[\w\[\]<>,.:*&?]+)\s+(?:[\w\[\]<>,.:*&?]+\s+)*[*&]*[A-Za-z_]\w*\s*\([^;]*\)\s*(?:const\s*)?(?:throws\s+[\w., ]+?\s*)?\{?\s*$"
).unwrap());

const STATEMENT_WORDS: &[&str] = &[
    "return", "else", "new", "throw", "await", "yield", "case", "delete", "typeof", "echo", "print", "goto",
];

static RE_CONSTANT: LazyLock<Regex> = LazyLock::new(|| Regex::new(concat!(
    r"^\s*(?:(?:pub(?:\([^)]*\))?|export|public|private|protected|readonly)\s+)*(?:const|static|let|var|final|val)\s+",
    r"|^[A-Z][A-Z0-9_]*\s*(?::[^=]+)?=",
)).unwrap());

/// Whether `line` opens a function, method or type declaration.
pub(crate) fn is_signature(line: &str, lang: Option<Language>) -> bool {
    if RE_SIGNATURE.is_match(line) {
        return true;
    }
    if !lang.is_some_and(|l| l.has_typed_signatures()) {
        return false;
    }
    RE_TYPED_SIGNATURE
        .captures(line)
        .is_some_and(|caps| !STATEMENT_WORDS.contains(&&caps["first"]))
}

/// Byte offset of a line-comment marker outside string literals.
fn find_line_comment(line: &str, marker: &str, single_quoted: bool) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if c == '"' || (single_quoted && c == '\'') {
            quote = Some(c);
        } else if line[i..].starts_with(marker) {
            return Some(i);
        }
    }
    None
}

/// Comment-stripping state.
#[derive(Debug, Default)]
struct MinimalScan {
    in_block_comment: bool,
    in_docstring: bool,
}

impl MinimalScan {
    fn step<'a>(&mut self, line: &'a str, comments: &CommentPatterns, docstrings: bool) -> Option<&'a str> {
        let trimmed = line.trim();

        if self.in_block_comment {
            if comments.block_end.is_some_and(|end| trimmed.ends_with(end)) {
                self.in_block_comment = false;
            }
            return None;
        }

        if docstrings {
            let markers = trimmed.matches("\"\"\"").count() + trimmed.matches("'''").count();
            if markers > 0 {
                if markers % 2 == 1 {
                    self.in_docstring = !self.in_docstring;
                }
                return Some(line);
            }
            if self.in_docstring {
                return Some(line);
            }
        }

        let is_doc = comments.doc.iter().any(|d| trimmed.starts_with(d));
        if let (Some(start), Some(end)) = (comments.block_start, comments.block_end) {
            if !is_doc && trimmed.starts_with(start) {
                // `/* ... */` on one line opens and closes at once
                if !trimmed[start.len()..].ends_with(end) {
                    self.in_block_comment = true;
                }
                return None;
            }
        }
        if is_doc {
            return Some(line);
        }

        if let Some(marker) = comments.line {
            if let Some(pos) = find_line_comment(line, marker, docstrings || marker == "#") {
                let code = line[..pos].trim_end();
                return if is_blank(code) { None } else { Some(code) };
            }
        }
        Some(line)
    }
}

/// Drop comments, keep doc comments and docstrings, collapse blank runs.
pub fn minimal(content: &str, lang: Language) -> String {
    let comments = lang.comments();
    let docstrings = lang.has_docstrings();
    let mut scan = MinimalScan::default();
    let mut out: Vec<&str> = Vec::new();
    let mut blank_run = 0;

    for line in content.lines() {
        let Some(kept) = scan.step(line, &comments, docstrings) else {
            continue;
        };
        if is_blank(kept) {
            blank_run += 1;
            if blank_run > MAX_BLANK_RUN {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push(kept);
    }
    out.join("\n").trim().to_string()
}

fn brace_delta(line: &str) -> i64 {
    line.matches('{').count() as i64 - line.matches('}').count() as i64
}

/// Signature-view state.
#[derive(Debug)]
struct AggressiveScan {
    lang: Language,
    in_implementation: bool,
    depth: i64,
    placeholder_emitted: bool,
}

impl AggressiveScan {
    fn enter(&mut self, trimmed: &str) {
        self.depth = brace_delta(trimmed);
        self.placeholder_emitted = false;
        // one-line bodies and bodiless declarations leave nothing to elide
        let closed = self.depth <= 0 && (trimmed.contains('{') || trimmed.ends_with(';'));
        self.in_implementation = !closed;
    }

    fn placeholder(&mut self, out: &mut Vec<String>) {
        if !self.placeholder_emitted {
            out.push(IMPLEMENTATION_PLACEHOLDER.to_string());
            self.placeholder_emitted = true;
        }
    }

    fn step(&mut self, line: &str, out: &mut Vec<String>) {
        let trimmed = line.trim();

        if RE_IMPORT.is_match(line) {
            out.push(line.to_string());
            return;
        }
        if is_signature(line, Some(self.lang)) {
            out.push(line.to_string());
            self.enter(trimmed);
            return;
        }

        if self.in_implementation {
            self.depth += brace_delta(trimmed);
            let structural = trimmed == "{" || trimmed == "}" || trimmed.ends_with('{');
            if self.depth <= 1 && structural {
                out.push(line.to_string());
            } else if !trimmed.is_empty() {
                self.placeholder(out);
            }
            if self.depth <= 0 {
                self.in_implementation = false;
                if !trimmed.is_empty() && trimmed != "}" {
                    self.placeholder(out);
                }
            }
            return;
        }

        if RE_CONSTANT.is_match(line) {
            out.push(line.to_string());
        }
    }
}

/// Imports, declarations and constants only; bodies become a placeholder.
pub fn aggressive(content: &str, lang: Language) -> String {
    let minimal = minimal(content, lang);
    let mut scan = AggressiveScan {
        lang,
        in_implementation: false,
        depth: 0,
        placeholder_emitted: false,
    };
    let mut out = Vec::new();
    for line in minimal.lines() {
        scan.step(line, &mut out);
    }
    out.join("\n").trim().to_string()
}

/// Filter `content` at `level`, or `None` when the level is `none` or the
/// language of `path` is unknown.
pub fn filter(content: &str, path: &str, level: FilterLevel) -> Option<String> {
    let lang = Language::from_path(path)?;
    match level {
        FilterLevel::None => None,
        FilterLevel::Minimal => Some(minimal(content, lang)),
        FilterLevel::Aggressive => Some(aggressive(content, lang)),
    }
}

/// Source filtering bound to one file path.
#[derive(Debug, Clone)]
pub struct SourceFilter {
    path: String,
    level: FilterLevel,
}

impl SourceFilter {
    pub fn new(path: impl Into<String>, level: FilterLevel) -> Self {
        Self { path: path.into(), level }
    }
}

impl Technique for SourceFilter {
    fn kind(&self) -> TechniqueKind {
        TechniqueKind::SourceFilter
    }

    fn apply(&self, text: &str, _command: Option<&str>) -> Option<String> {
        filter(text, &self.path, self.level)
    }
}
