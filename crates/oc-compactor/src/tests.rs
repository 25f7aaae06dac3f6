use crate::*;
use crate::block::BlockAccumulator;
use crate::source_filter::is_signature;
use oc_core::config::{GitConfig, SearchConfig};
use oc_core::{EngineConfig, FilterLevel, InMemoryMetrics, InputKind, MetricsSink, MetricsSummary, Session, TechniqueKind};
use std::borrow::Cow;
use std::sync::Arc;

// ========== ANSI ==========

#[test]
fn test_ansi_strip_csi() {
    assert_eq!(ansi::strip("\x1b[31mred\x1b[0m plain"), "red plain");
    assert_eq!(ansi::strip("\x1b[1;32;40mbold\x1b[K"), "bold");
}

#[test]
fn test_ansi_strip_osc_hyperlink() {
    let text = "\x1b]8;;https://example.com\x07link\x1b]8;;\x07";
    assert_eq!(ansi::strip(text), "link");
    let st = "\x1b]0;title\x1b\\after";
    assert_eq!(ansi::strip(st), "after");
}

#[test]
fn test_ansi_strip_lone_escape() {
    assert_eq!(ansi::strip("a\x1bb"), "ab");
    assert!(!ansi::strip("\x1b(Bx\x1b=\x1b").contains('\x1b'));
}

#[test]
fn test_ansi_idempotent() {
    let samples = ["\x1b[31mred\x1b[0m", "plain", "\x1b]2;t\x07x\x1b[2J", "\x1b\x1b[0m"];
    for s in samples {
        let once = ansi::strip(s).into_owned();
        assert_eq!(ansi::strip(&once), once);
    }
}

#[test]
fn test_ansi_passthrough_borrows() {
    assert!(matches!(ansi::strip("no escapes here"), Cow::Borrowed("no escapes here")));
    assert_eq!(ansi::AnsiStripper.apply("no escapes here", None), None);
}

// ========== Classification ==========

#[test]
fn test_classify_build() {
    assert!(classify::is_build_command("go build ./..."));
    assert!(classify::is_build_command("CARGO BUILD --release"));
    assert!(classify::is_build_command("npx tsc --noEmit"));
    assert!(!classify::is_build_command("cat tsconfig.json"));
    assert!(!classify::is_build_command("ls -la"));
}

#[test]
fn test_classify_test_whole_token() {
    assert!(classify::is_test_command("cargo test"));
    assert!(classify::is_test_command("npx jest --ci"));
    assert!(classify::is_test_command("python -m pytest -q"));
    assert!(!classify::is_test_command("cat contest.txt"));
    assert!(!classify::is_test_command("echo attestation"));
}

#[test]
fn test_classify_lint_label() {
    assert_eq!(classify::linter_label("npx eslint src"), Some("ESLint"));
    assert_eq!(classify::linter_label("cargo clippy --all-targets"), Some("Clippy"));
    assert_eq!(classify::linter_label("ruff check ."), Some("Ruff"));
    assert_eq!(classify::linter_label("npm run lint"), Some("Linter"));
    assert_eq!(classify::linter_label("cat .eslintrc"), None);
    assert_eq!(classify::linter_label("git commit -m 'fix lint'"), None);
}

#[test]
fn test_classify_git_and_search() {
    assert!(classify::is_git_command("git status"));
    assert!(!classify::is_git_command("gitk"));
    assert!(classify::is_search_command("rg TODO src"));
    assert!(classify::is_search_command("grep -rn foo ."));
    assert!(!classify::is_search_command("cat grepper.txt"));
}

// ========== Paths & text ==========

#[test]
fn test_compact_long_path() {
    let path = "/alpha/bravo/charlie/delta/echo/foxtrot/component.ts";
    assert!(path.len() > 50);
    assert_eq!(paths::compact_path(path), "alpha/.../foxtrot/component.ts");
}

#[test]
fn test_compact_path_short_or_shallow() {
    assert_eq!(paths::compact_path("src/main.rs"), "src/main.rs");
    let shallow = "a_very_long_directory_name_here/another_long_name/file_name.rs";
    assert_eq!(paths::compact_path(shallow), shallow);
}

#[test]
fn test_compact_path_deep_but_short_is_unchanged() {
    assert_eq!(paths::compact_path("/a/b/c/d/e/file.ts"), "/a/b/c/d/e/file.ts");
}

#[test]
fn test_truncate_chars() {
    assert_eq!(text::truncate_chars("abcdefghij", 5), "ab...");
    assert_eq!(text::truncate_chars("abc", 5), "abc");
    assert_eq!(text::truncate_chars("ééééééé", 6), "ééé...");
}

#[test]
fn test_rank_counts_ties_by_name() {
    let ranked = text::rank_counts(vec![("b", 2), ("a", 2), ("c", 5)]);
    assert_eq!(ranked, vec![("c", 5), ("a", 2), ("b", 2)]);
}

// ========== Block accumulator ==========

#[test]
fn test_block_closes_after_two_blanks_when_large() {
    let mut acc = BlockAccumulator::default();
    acc.open("FAIL a");
    for line in ["  x", "  y", "  z", ""] {
        assert!(acc.extend(line, |l| l.starts_with(' ')));
    }
    assert!(acc.extend("", |l| l.starts_with(' ')));
    assert!(!acc.is_open());
    assert_eq!(acc.finish(), vec![vec!["FAIL a", "  x", "  y", "  z"]]);
}

#[test]
fn test_block_small_survives_blank_run() {
    let mut acc = BlockAccumulator::default();
    acc.open("FAIL b");
    acc.extend("", |l| l.starts_with(' '));
    acc.extend("", |l| l.starts_with(' '));
    assert!(acc.is_open());
    acc.extend("  more", |l| l.starts_with(' '));
    assert_eq!(acc.finish(), vec![vec!["FAIL b", "", "", "  more"]]);
}

#[test]
fn test_block_non_continuation_closes() {
    let mut acc = BlockAccumulator::default();
    acc.open("error: x");
    assert!(!acc.extend("next thing", |l| l.starts_with(' ')));
    assert!(!acc.is_open());
    assert_eq!(acc.len(), 1);
}

// ========== Build ==========

#[test]
fn test_build_success() {
    let text = "   Compiling foo v0.1.0\n   Compiling bar v0.2.0\n    Finished dev [unoptimized] target(s)";
    assert_eq!(
        build::aggregate(text, "go build").as_deref(),
        Some("[OK] Build successful (2 units compiled)")
    );
}

#[test]
fn test_build_not_applicable() {
    assert_eq!(build::aggregate("   Compiling foo", "ls"), None);
    assert_eq!(build::BuildAggregator.apply("   Compiling foo", None), None);
}

#[test]
fn test_build_errors_and_warnings() {
    let text = "\
   Compiling app v0.1.0
error[E0308]: mismatched types
  --> src/main.rs:4:18
   |
   = note: expected `i32`
warning: unused import: `std::fs`
error: aborting due to 1 previous error";
    let out = build::aggregate(text, "cargo build").unwrap();
    assert!(out.starts_with("[ERROR] 2 error(s):\nerror[E0308]: mismatched types"));
    assert!(out.contains("  --> src/main.rs:4:18"));
    assert!(out.contains("\n\nerror: aborting due to 1 previous error"));
    assert!(out.ends_with("[WARN] 1 warning(s)"));
}

#[test]
fn test_build_warnings_only() {
    let text = "   Compiling app v0.1.0\nwarning: unused variable: `x`\nwarning: unused variable: `y`";
    assert_eq!(
        build::aggregate(text, "cargo build").as_deref(),
        Some("[OK] Build successful (1 units compiled)\n[WARN] 2 warning(s)")
    );
}

#[test]
fn test_build_caps_errors_and_block_lines() {
    let mut lines: Vec<String> = (0..7).map(|i| format!("error: e{i}")).collect();
    lines.extend((0..15).map(|i| format!("    detail {i}")));
    let report = build::BuildReport::scan(&lines.join("\n"));
    assert_eq!(report.errors.len(), 7);
    assert_eq!(report.errors[6].len(), 16);

    let out = report.render();
    assert!(out.contains("... and 2 more errors"));
    assert!(!out.contains("error: e5"));
    assert!(!out.contains("  ..."));

    let long: String = std::iter::once("error: long".to_string())
        .chain((0..15).map(|i| format!("    detail {i}")))
        .collect::<Vec<_>>()
        .join("\n");
    let out = build::aggregate(&long, "make").unwrap();
    assert!(out.contains("    detail 8\n  ..."));
    assert!(!out.contains("detail 9"));
}

#[test]
fn test_build_located_compiler_diagnostics() {
    let text = "\
gcc -c main.c
main.c:3:5: error: expected ';' before 'return'
    3 |     x = 1
      |          ^
util.c:9: warning: unused variable 'y'";
    let out = build::aggregate(text, "make").unwrap();
    assert!(out.starts_with("[ERROR] 1 error(s):\nmain.c:3:5: error: expected ';' before 'return'"));
    assert!(out.contains("\n    3 |     x = 1\n      |          ^"));
    assert!(out.ends_with("[WARN] 1 warning(s)"));

    // A binding named `error` in a snippet line stays inside its block.
    let text = "error[E0425]: cannot find value\n  --> src/lib.rs:2:5\n   |     let error: u32 = 1;";
    let report = build::BuildReport::scan(text);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].len(), 3);
}

// ========== Test runners ==========

#[test]
fn test_cargo_summary() {
    let out = test_output::aggregate("test result: ok. 3 passed; 1 failed;", "cargo test").unwrap();
    assert!(out.contains("PASS: 3 passed"));
    assert!(out.contains("FAIL: 1 failed"));
    assert!(!out.contains("SKIP"));
}

#[test]
fn test_cargo_failures_captured() {
    let text = "\
running 4 tests
test a ... ok
test d ... FAILED

failures:

---- d stdout ----
thread 'd' panicked at src/lib.rs:10:5

test result: FAILED. 3 passed; 1 failed; 2 ignored; 0 measured; 0 filtered out";
    let out = test_output::aggregate(text, "cargo test").unwrap();
    assert!(out.starts_with("Test Results:\n   PASS: 3 passed\n   FAIL: 1 failed\n   SKIP: 2 skipped"));
    assert!(out.contains("\n\n   Failures:\n   - test d ... FAILED"));
    assert!(out.contains("   - thread 'd' panicked at src/lib.rs:10:5"));
}

#[test]
fn test_jest_and_pytest_summaries() {
    let jest = test_output::TestCounts::from_summary("Tests:       1 failed, 2 skipped, 5 passed, 8 total");
    assert_eq!(jest, test_output::TestCounts { passed: 5, failed: 1, skipped: 2 });

    let pytest = test_output::TestCounts::from_summary("==== 2 failed, 10 passed, 1 skipped in 0.52s ====");
    assert_eq!(pytest, test_output::TestCounts { passed: 10, failed: 2, skipped: 1 });
}

#[test]
fn test_marker_fallback() {
    let text = "PASS src/a.test.js\nPASS src/b.test.js\nFAIL src/c.test.js\n  ● c › works\n    expected 1";
    let report = test_output::TestReport::scan(text);
    assert_eq!(report.counts.passed, 2);
    assert_eq!(report.counts.failed, 1);
    assert!(!report.failures.is_empty());
    assert!(report.render().contains("   Failures:"));
}

#[test]
fn test_failure_detail_is_capped() {
    let text = "FAIL src/x.test.js\n  line one\n  line two\n  line three\n  line four\n  line five";
    let out = test_output::aggregate(text, "jest").unwrap();
    assert!(out.contains("     line three\n     ... (2 more lines)"));
    assert!(!out.contains("line four"));
}

#[test]
fn test_failure_list_is_capped() {
    let text: String = (0..6).map(|i| format!("FAIL src/t{i}.test.js\n  boom {i}\n")).collect();
    let out = test_output::aggregate(&text, "jest").unwrap();
    assert!(out.contains("   - FAIL src/t4.test.js\n     boom 4\n   ... and 1 more failures"));
    assert!(!out.contains("t5.test.js"));

    let five: String = (0..5).map(|i| format!("FAIL src/t{i}.test.js\n")).collect();
    let out = test_output::aggregate(&five, "jest").unwrap();
    assert!(!out.contains("more failures"));
}

#[test]
fn test_failure_lines_are_cut_past_their_width() {
    let text = format!(
        "FAIL {}\n  {}\nFAIL {}\n  {}",
        "a".repeat(66),
        "b".repeat(66),
        "c".repeat(65),
        "d".repeat(65)
    );
    let out = test_output::aggregate(&text, "jest").unwrap();
    assert!(out.contains(&format!("   - FAIL {}...\n", "a".repeat(62))));
    assert!(out.contains(&format!("     {}...\n", "b".repeat(62))));
    assert!(out.contains(&format!("   - FAIL {}\n", "c".repeat(65))));
    assert!(out.ends_with(&format!("     {}", "d".repeat(65))));
}

#[test]
fn test_test_aggregator_falls_back_to_none() {
    assert_eq!(test_output::aggregate("nothing recognizable", "npm test"), None);
    assert_eq!(test_output::aggregate("test result: ok. 3 passed; 0 failed;", "ls"), None);
}

// ========== Linters ==========

#[test]
fn test_eslint_unix_report() {
    let text = "\
src/app.js:10:5: Unexpected console statement [Error/no-console]
src/app.js:12:1: 'x' is defined but never used [Warning/no-unused-vars]
src/util.js:3:9: Unexpected console statement [Error/no-console]

3 problems";
    let out = lint::aggregate(text, "npx eslint --format unix src").unwrap();
    assert_eq!(
        out,
        "ESLint: 2 errors, 1 warnings in 2 files\n\
         \n\
         Top rules:\n  no-console (2x)\n  no-unused-vars (1x)\n\
         \n\
         Top files:\n  src/app.js (2 issues)\n    no-console (1), no-unused-vars (1)\n\
         \x20 src/util.js (1 issues)\n    no-console (1)"
    );
}

#[test]
fn test_lint_severity_shape() {
    let issue = lint::parse_line("warning: Missing docstring at src/a.py:3").unwrap();
    assert_eq!(issue.severity, lint::Severity::Warning);
    assert_eq!(issue.file, "src/a.py");
    assert_eq!(issue.line, Some(3));
    assert_eq!(issue.rule, "unknown");

    let issue = lint::parse_line("main.go:3:1: warning unused thing").unwrap();
    assert_eq!(issue.severity, lint::Severity::Warning);
    let issue = lint::parse_line("a.py:1:1: E501 line too long [E501]").unwrap();
    assert_eq!(issue.severity, lint::Severity::Error);
    assert_eq!(issue.rule, "E501");
}

#[test]
fn test_lint_top_rules_cap() {
    let text: String = (0..11)
        .flat_map(|i| (0..=i).map(move |n| format!("src/a.py:{n}:1: bad [r{i:02}]\n")))
        .collect();
    let out = lint::aggregate(&text, "ruff check .").unwrap();
    assert!(out.contains("Top rules:\n  r10 (11x)\n"));
    assert!(out.contains("  r01 (2x)\n\nTop files:"));
    assert!(!out.contains("r00"));
}

#[test]
fn test_lint_top_files_cap() {
    let text: String = (0..11)
        .flat_map(|i| (0..=i).map(move |n| format!("f{i:02}.py:{n}:1: bad [E1]\n")))
        .collect();
    let out = lint::aggregate(&text, "ruff check .").unwrap();
    assert!(out.starts_with("Ruff: 66 errors, 0 warnings in 11 files"));
    assert!(out.contains("Top files:\n  f10.py (11 issues)\n"));
    assert!(out.ends_with("  f01.py (2 issues)\n    E1 (2)"));
    assert!(!out.contains("f00.py"));
}

#[test]
fn test_lint_rules_per_file_cap() {
    let text: String = [("alpha", 4), ("bravo", 3), ("charlie", 2), ("delta", 1)]
        .iter()
        .flat_map(|(rule, n)| (0..*n).map(move |l| format!("one.py:{l}:1: bad [{rule}]\n")))
        .collect();
    let out = lint::aggregate(&text, "ruff check .").unwrap();
    assert!(out.contains("  delta (1x)"));
    assert!(out.ends_with("  one.py (10 issues)\n    alpha (4), bravo (3), charlie (2)"));
}

#[test]
fn test_lint_no_issues_and_not_applicable() {
    assert_eq!(
        lint::aggregate("All checks passed!", "ruff check .").as_deref(),
        Some("[OK] Ruff: No issues found")
    );
    assert_eq!(lint::aggregate("a.py:1:1: x", "git commit -m lint"), None);
    assert_eq!(lint::LintAggregator.apply("a.py:1:1: x", None), None);
}

// ========== Git ==========

#[test]
fn test_git_subcommand_skips_globals() {
    assert_eq!(git::subcommand("git -C repo --no-pager status"), Some(git::Subcommand::Status));
    assert_eq!(git::subcommand("git -c color.ui=always diff HEAD"), Some(git::Subcommand::Diff));
    assert_eq!(git::subcommand("git push"), Some(git::Subcommand::Other));
    assert_eq!(git::subcommand("ls"), None);
}

#[test]
fn test_git_diff_compaction() {
    let text = "\
diff --git a/src/lib.rs b/src/lib.rs
index 123..456 100644
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,3 +1,4 @@
 use std::fmt;
+use std::io;
 fn main() {}
-old";
    assert_eq!(
        git::compact_diff(text, 50, 10),
        "src/lib.rs\n  @@ -1,3 +1,4 @@\n  +use std::io;\n   fn main() {}\n  -old\n  +1 -1"
    );
}

#[test]
fn test_git_diff_hunk_cap_and_budget() {
    let mut text = String::from("diff --git a/a.txt b/a.txt\n@@ -0,0 +1,15 @@\n");
    for i in 0..15 {
        text.push_str(&format!("+line {i}\n"));
    }
    let out = git::compact_diff(&text, 50, 10);
    assert!(out.contains("  +line 9\n  ... (truncated)"));
    assert!(!out.contains("line 10"));
    assert!(out.ends_with("  +15 -0"));

    let capped = git::compact_diff(&text, 5, 10);
    assert!(capped.contains("... (more changes truncated)"));
    assert!(capped.lines().count() <= 5);
}

fn added_lines_diff(n: usize) -> String {
    let mut text = format!("diff --git a/a.txt b/a.txt\n@@ -0,0 +1,{n} @@\n");
    for i in 0..n {
        text.push_str(&format!("+line {i}\n"));
    }
    text
}

#[test]
fn test_git_hunk_exactly_at_cap_is_not_marked() {
    let out = git::compact_diff(&added_lines_diff(10), 50, 10);
    assert!(!out.contains("(truncated)"));
    assert!(out.ends_with("  +line 9\n  +10 -0"));

    let out = git::compact_diff(&added_lines_diff(11), 50, 10);
    assert!(out.ends_with("  +line 9\n  ... (truncated)\n  +11 -0"));
    assert!(!out.contains("line 10"));
}

#[test]
fn test_git_diff_exact_fit_has_no_budget_marker() {
    // File header, hunk header and 8 changes fill a 10-line budget exactly.
    let out = git::compact_diff(&added_lines_diff(8), 10, 10);
    assert!(!out.contains("more changes truncated"));
    assert!(out.ends_with("  +line 7\n  +8 -0"));

    let out = git::compact_diff(&added_lines_diff(9), 10, 10);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 10);
    assert_eq!(lines[8], "... (more changes truncated)");
    assert!(!out.contains("line 7"));
}

#[test]
fn test_git_status_buckets() {
    let text = "## main...origin/main\nM  staged.rs\n M modified.rs\nMM both.rs\n?? new.txt\nUU conflict.rs";
    assert_eq!(
        git::compact_status(text),
        "Branch: main\n\
         Staged: 2 files\n   staged.rs\n   both.rs\n\
         Modified: 2 files\n   modified.rs\n   both.rs\n\
         Untracked: 1 files\n   new.txt\n\
         [WARN] 1 conflict(s): conflict.rs"
    );
}

#[test]
fn test_git_status_clean() {
    assert_eq!(git::compact_status(""), "Clean working tree");
    assert_eq!(git::compact_status("\n"), "Clean working tree");
    assert_eq!(git::compact_status("## main"), "Branch: main\nClean working tree");
}

#[test]
fn test_git_status_untracked_cap() {
    let text: String = (0..5).map(|i| format!("?? f{i}.txt\n")).collect();
    let out = git::compact_status(&text);
    assert!(out.starts_with("Untracked: 5 files\n   f0.txt\n   f1.txt\n   f2.txt\n   ... +2 more"));
}

#[test]
fn test_git_log_limit() {
    let long = "a".repeat(100);
    let mut lines = vec![long.clone()];
    lines.extend((1..25).map(|i| format!("abc{i:04} commit {i}")));
    let out = git::compact_log(&lines.join("\n"), 20);
    let out_lines: Vec<&str> = out.lines().collect();
    assert_eq!(out_lines.len(), 21);
    assert_eq!(out_lines[0].chars().count(), 80);
    assert!(out_lines[0].ends_with("..."));
    assert_eq!(out_lines[20], "... and 5 more commits");
}

#[test]
fn test_git_compact_dispatch() {
    let config = GitConfig::default();
    assert_eq!(git::compact("", "git diff", &config), None);
    assert_eq!(git::compact("On branch main\nnothing to commit", "git status", &config), None);
    assert_eq!(git::compact("anything", "git push", &config), None);
    assert_eq!(
        git::compact("?? a.txt", "git status --porcelain", &config).as_deref(),
        Some("Untracked: 1 files\n   a.txt")
    );
}

// ========== Search ==========

fn search_lines(file: &str, n: usize) -> String {
    (1..=n).map(|i| format!("{file}:{i}:let x{i} = {i};")).collect::<Vec<_>>().join("\n")
}

#[test]
fn test_search_per_file_cap() {
    let out = search::group_search_results(&search_lines("src/main.rs", 12), "rg x").unwrap();
    assert!(out.starts_with("12 matches in 1 files:\n\n> src/main.rs (12 matches):"));
    assert_eq!(out.lines().filter(|l| l.starts_with("    ")).count(), 10);
    assert!(out.ends_with("  +2 more"));
    assert!(!out.contains("... +"));
}

#[test]
fn test_search_global_cap() {
    let text = [search_lines("a.rs", 4), search_lines("b.rs", 4), search_lines("c.rs", 4)].join("\n");
    let config = SearchConfig { max_results: 5, per_file: 10 };
    let out = search::group(&text, "grep -rn x .", &config).unwrap();
    assert!(out.contains("> b.rs (4 matches):\n    1: let x1 = 1;\n  +3 more"));
    assert!(!out.contains("> c.rs"));
    assert!(out.ends_with("... +7 more"));
}

#[test]
fn test_search_missing_line_number() {
    let result = search::parse_line("src/a.rs:match here").unwrap();
    assert_eq!(result.line, "?");
    assert_eq!(result.content, "match here");
}

#[test]
fn test_search_not_applicable() {
    assert_eq!(search::group_search_results("src/a.rs:1:x", "cat src/a.rs"), None);
    assert_eq!(search::group_search_results("no matches", "rg x"), None);
    assert_eq!(search::SearchGrouper::default().apply("src/a.rs:1:x", None), None);
}

// ========== Source filter ==========

#[test]
fn test_minimal_rust() {
    let src = "\
//! crate doc
use std::io;

// helper comment
/* block
   comment */
/// Adds numbers.
fn add(a: i32, b: i32) -> i32 {
    a + b // inline
}



const URL: &str = \"http://example.com\";
";
    assert_eq!(
        source_filter::minimal(src, Language::Rust),
        "//! crate doc\nuse std::io;\n\n/// Adds numbers.\nfn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n\n\nconst URL: &str = \"http://example.com\";"
    );
}

#[test]
fn test_minimal_python_docstring() {
    let src = "def f():\n    \"\"\"Doc line.\n\n    More.\n    \"\"\"\n    # comment\n    return 1  # trailing\n";
    assert_eq!(
        source_filter::minimal(src, Language::Python),
        "def f():\n    \"\"\"Doc line.\n\n    More.\n    \"\"\"\n    return 1"
    );
}

#[test]
fn test_aggressive_function_body() {
    let src = "\
use std::collections::HashMap;

const LIMIT: usize = 10;

pub fn add(a: i32, b: i32) -> i32 {
    let sum = a + b;
    let doubled = sum * 2;
    doubled
}
";
    assert_eq!(
        source_filter::aggressive(src, Language::Rust),
        "use std::collections::HashMap;\nconst LIMIT: usize = 10;\npub fn add(a: i32, b: i32) -> i32 {\n    // ... implementation\n}"
    );
}

#[test]
fn test_aggressive_brace_on_next_line() {
    let src = "public int Add(int a, int b)\n{\n    int sum = a + b;\n    return sum;\n}\n";
    assert_eq!(
        source_filter::aggressive(src, Language::CSharp),
        "public int Add(int a, int b)\n{\n    // ... implementation\n}"
    );
}

#[test]
fn test_aggressive_python() {
    let src = "import os\n\ndef greet(name):\n    message = \"hi \" + name\n    return message\n";
    let out = source_filter::aggressive(src, Language::Python);
    assert!(out.starts_with("import os\ndef greet(name):"));
    assert!(out.contains("// ... implementation"));
    assert!(!out.contains("return message"));
}

#[test]
fn test_signature_detection() {
    assert!(is_signature("impl<T> Display for Wrapper<T> {", Some(Language::Rust)));
    assert!(is_signature("func (s *Server) Start() error {", Some(Language::Go)));
    assert!(is_signature("export default function App() {", Some(Language::TypeScript)));
    assert!(is_signature("public static void main(String[] args) {", Some(Language::Java)));
    assert!(!is_signature("    return compute(x)", Some(Language::Java)));
    assert!(!is_signature("  type: 'button',", Some(Language::TypeScript)));
    assert!(!is_signature("public static void main(String[] args) {", None));
}

#[test]
fn test_filter_levels_and_unknown_language() {
    assert_eq!(source_filter::filter("// x\ncode", "notes.txt", FilterLevel::Minimal), None);
    assert_eq!(source_filter::filter("// x\ncode", "a.rs", FilterLevel::None), None);
    assert_eq!(source_filter::filter("// x\ncode", "a.rs", FilterLevel::Minimal).as_deref(), Some("code"));
}

#[test]
fn test_language_from_path() {
    assert_eq!(Language::from_path("src/App.TSX"), Some(Language::TypeScript));
    assert_eq!(Language::from_path("Makefile"), None);
    assert_eq!(Language::Lua.comments().block_start, Some("--[["));
}

// ========== Smart truncation ==========

#[test]
fn test_smart_truncate_budget() {
    let src: String = (0..500)
        .map(|i| if i % 50 == 0 { format!("pub fn item_{i}() {{}}\n") } else { format!("    let v{i} = {i};\n") })
        .collect();
    let out = smart_truncate::smart_truncate(&src, 200, Some(Language::Rust)).unwrap();
    let lines: Vec<&str> = out.lines().collect();

    assert!(lines.len() <= 200);
    assert_eq!(lines.iter().filter(|l| l.starts_with("pub fn item_")).count(), 10);
    assert_eq!(*lines.last().unwrap(), "// ... 392 more lines (total: 500)");

    let is_marker = |l: &&str| l.trim_start().starts_with("// ...") && l.ends_with("lines omitted");
    assert_eq!(lines.iter().filter(|l| is_marker(*l)).count(), 7);
    for pair in lines.windows(2) {
        assert!(!(is_marker(&pair[0]) && is_marker(&pair[1])));
    }
}

#[test]
fn test_smart_truncate_stops_at_budget() {
    let src: String = (0..500).map(|i| format!("pub fn f{i}() {{}}\n")).collect();
    let out = smart_truncate::smart_truncate(&src, 200, Some(Language::Rust)).unwrap();
    assert_eq!(out.lines().count(), 200);
    assert!(out.ends_with("// ... 301 more lines (total: 500)"));
}

#[test]
fn test_smart_truncate_fits() {
    assert_eq!(smart_truncate::smart_truncate("a\nb\nc", 3, None), None);
}

// ========== Length truncation ==========

#[test]
fn test_truncate_middle() {
    assert_eq!(
        truncate::truncate("abcdefghij", 4).as_deref(),
        Some("ab\n... [6 chars truncated] ...\nij")
    );
    assert_eq!(truncate::truncate("short", 10), None);
}

#[test]
fn test_truncate_char_boundaries() {
    assert_eq!(
        truncate::truncate("ééééé", 2).as_deref(),
        Some("é\n... [3 chars truncated] ...\né")
    );
    assert_eq!(truncate::truncate("éé", 2), None);
}

// ========== Engine ==========

#[test]
fn test_engine_command_chain() {
    let engine = Engine::new();
    let text = "\x1b[32m   Compiling foo v0.1.0\x1b[0m\n   Compiling bar v0.1.0\n";
    let outcome = engine.process_command_output(&Session::default(), text, Some("go build"));
    assert_eq!(outcome.text, "[OK] Build successful (2 units compiled)");
    assert_eq!(outcome.applied, vec![TechniqueKind::AnsiStrip, TechniqueKind::BuildAggregate]);
    assert!(outcome.changed());
    assert!(outcome.saved_chars() > 0);
}

#[test]
fn test_engine_respects_toggles() {
    let engine = Engine::new();
    let session = Session::default().with_technique(TechniqueKind::BuildAggregate, false);
    let outcome = engine.process_command_output(&session, "\x1b[1m   Compiling foo\x1b[0m", Some("cargo build"));
    assert_eq!(outcome.text, "   Compiling foo");
    assert_eq!(outcome.applied, vec![TechniqueKind::AnsiStrip]);
}

#[test]
fn test_engine_disabled_session_passthrough() {
    let sink = Arc::new(InMemoryMetrics::new());
    let engine = Engine::with_sink(sink.clone());
    let session = Session::default().with_enabled(false);
    let text = "\x1b[31mred\x1b[0m";
    let outcome = engine.process_command_output(&session, text, Some("ls"));
    assert_eq!(outcome.text, text);
    assert!(!outcome.changed());
    assert!(sink.is_empty());
}

#[test]
fn test_engine_truncates_long_output() {
    let text = "x".repeat(20_000);
    let outcome = Engine::new().process_command_output(&Session::default(), &text, Some("cat big.log"));
    assert_eq!(outcome.applied, vec![TechniqueKind::Truncate]);
    assert!(outcome.text.contains("[10000 chars truncated]"));
    assert_eq!(outcome.original_chars, 20_000);
}

#[test]
fn test_engine_file_paths() {
    let engine = Engine::new();
    let session = Session::default();
    let outcome = engine.process_file(&session, "// note\nfn main() {}\n", "src/main.rs");
    assert_eq!(outcome.text, "fn main() {}");
    assert_eq!(outcome.applied, vec![TechniqueKind::SourceFilter]);

    let off = session.with_source_level(FilterLevel::None);
    let outcome = engine.process_file(&off, "// note\nfn main() {}\n", "src/main.rs");
    assert!(!outcome.changed());

    let notes: String = (0..300).map(|i| format!("line {i}\n")).collect();
    let outcome = engine.process_file(&session, &notes, "notes.txt");
    assert_eq!(outcome.applied, vec![TechniqueKind::SmartTruncate]);
    assert!(outcome.text.lines().count() <= 200);
}

#[test]
fn test_engine_search_and_metrics() {
    let sink = Arc::new(InMemoryMetrics::new());
    let engine = Engine::with_sink(sink.clone());
    let session = Session::new(EngineConfig::default());

    let outcome = engine.process_search(&session, &search_lines("src/lib.rs", 12), Some("rg x"));
    assert_eq!(outcome.applied, vec![TechniqueKind::SearchGroup]);
    let untouched = engine.process_search(&session, "src/lib.rs:1:x", None);
    assert!(!untouched.changed());

    let records = sink.snapshot();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].input, InputKind::SearchResult);
    assert_eq!(records[0].label, "rg x");
    assert_eq!(records[1].label, "search");

    let summary = MetricsSummary::from_records(&records);
    assert_eq!(summary.calls, 2);
    assert_eq!(summary.technique_counts.get(&TechniqueKind::SearchGroup), Some(&1));
}
