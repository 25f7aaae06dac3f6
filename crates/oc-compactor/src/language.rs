//! Extension → language table with comment syntax.

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Go,
    Java,
    Kotlin,
    CFamily,
    CSharp,
    Swift,
    Ruby,
    Shell,
    Lua,
    Sql,
}

/// Comment markers of one language. Absent markers disable that rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentPatterns {
    pub line: Option<&'static str>,
    pub block_start: Option<&'static str>,
    pub block_end: Option<&'static str>,
    pub doc: &'static [&'static str],
}

const C_STYLE: CommentPatterns = CommentPatterns {
    line: Some("//"),
    block_start: Some("/*"),
    block_end: Some("*/"),
    doc: &["/**"],
};

const HASH_STYLE: CommentPatterns = CommentPatterns {
    line: Some("#"),
    block_start: None,
    block_end: None,
    doc: &[],
};

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        let lang = match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "rs" => Self::Rust,
            "py" | "pyi" => Self::Python,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => Self::TypeScript,
            "go" => Self::Go,
            "java" => Self::Java,
            "kt" | "kts" | "scala" => Self::Kotlin,
            "c" | "h" | "cc" | "cpp" | "cxx" | "hpp" | "hh" => Self::CFamily,
            "cs" => Self::CSharp,
            "swift" => Self::Swift,
            "rb" => Self::Ruby,
            "sh" | "bash" | "zsh" => Self::Shell,
            "lua" => Self::Lua,
            "sql" => Self::Sql,
            _ => return None,
        };
        Some(lang)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref().extension().and_then(|e| e.to_str()).and_then(Self::from_extension)
    }

    pub fn comments(&self) -> CommentPatterns {
        match self {
            Self::Rust => CommentPatterns { doc: &["///", "//!"], ..C_STYLE },
            Self::Go => CommentPatterns { doc: &[], ..C_STYLE },
            Self::CSharp => CommentPatterns { doc: &["///", "/**"], ..C_STYLE },
            Self::JavaScript | Self::TypeScript | Self::Java | Self::Kotlin | Self::CFamily | Self::Swift => C_STYLE,
            Self::Python | Self::Shell => HASH_STYLE,
            Self::Ruby => CommentPatterns { block_start: Some("=begin"), block_end: Some("=end"), ..HASH_STYLE },
            Self::Lua => CommentPatterns {
                line: Some("--"),
                block_start: Some("--[["),
                block_end: Some("]]"),
                doc: &["---"],
            },
            Self::Sql => CommentPatterns { line: Some("--"), doc: &[], ..C_STYLE },
        }
    }

    /// Languages whose methods are declared as `Type name(...)`.
    pub fn has_typed_signatures(&self) -> bool {
        matches!(self, Self::Java | Self::CFamily | Self::CSharp)
    }

    /// Only Python documents with triple-quoted strings.
    pub fn has_docstrings(&self) -> bool {
        matches!(self, Self::Python)
    }
}
