//! Output compactor. Shrinks command output, file reads and search results
//! before they reach a model's context window.
//!
//! Techniques:
//! 1. ANSI strip: remove terminal escape sequences
//! 2. Build aggregation: compiled units and error blocks
//! 3. Test aggregation: counts and failure excerpts
//! 4. Git compaction: diff stats, bucketed status and capped log
//! 5. Linter aggregation: issue totals by rule and file
//! 6. Length truncation: middle-omission past a character budget
//! 7. Source filtering: comment stripping or signature-only views
//! 8. Smart truncation: line budget that keeps structural lines
//! 9. Search grouping: matches grouped per file

pub mod ansi;
pub mod block;
pub mod build;
pub mod classify;
pub mod engine;
pub mod git;
pub mod language;
pub mod lint;
pub mod paths;
pub mod search;
pub mod smart_truncate;
pub mod source_filter;
pub mod technique;
pub mod test_output;
pub mod text;
pub mod truncate;

pub use engine::{Engine, Outcome};
pub use language::Language;
pub use technique::Technique;

#[cfg(test)]
mod tests;
