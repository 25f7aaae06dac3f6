//! Command classification per tool domain.
//!
//! Build, lint and search use case-insensitive substring matching bounded by
//! non-word characters; test runners must appear as a standalone token.

use regex::Regex;
use std::sync::LazyLock;

const BUILD_TOOLS: &[&str] = &[
    "cargo build", "cargo check", "go build", "npm run build", "yarn build", "yarn run build",
    "pnpm build", "pnpm run build", "bun run build", "tsc", "webpack", "vite build", "next build",
    "mvn compile", "mvn package", "mvn install", "gradle build", "gradlew build", "dotnet build",
    "make", "cmake --build", "ninja", "bazel build", "swift build",
];

const TEST_RUNNERS: &[&str] = &[
    "test", "tests", "jest", "vitest", "pytest", "mocha", "jasmine", "karma", "rspec",
    "phpunit", "nextest", "unittest", "ctest", "tox", "nose2", "playwright", "cypress",
];

/// Known linters and the label used in reports.
const LINTERS: &[(&str, &str)] = &[
    ("eslint", "ESLint"),
    ("ruff", "Ruff"),
    ("pylint", "Pylint"),
    ("flake8", "Flake8"),
    ("mypy", "Mypy"),
    ("clippy", "Clippy"),
    ("golangci-lint", "golangci-lint"),
    ("rubocop", "RuboCop"),
    ("stylelint", "Stylelint"),
    ("tslint", "TSLint"),
    ("biome", "Biome"),
    ("shellcheck", "ShellCheck"),
    ("hadolint", "Hadolint"),
    ("lint", "Linter"),
];

const SEARCH_TOOLS: &[&str] = &["grep", "egrep", "fgrep", "rg", "ripgrep", "ag", "ack", "git grep", "findstr"];

fn word_list_regex(words: &[&str]) -> Regex {
    let alternation = words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join("|");
    Regex::new(&format!(r"(?i)(?:^|[^\w-])({alternation})(?:$|[^\w-])")).unwrap()
}

static RE_BUILD: LazyLock<Regex> = LazyLock::new(|| word_list_regex(BUILD_TOOLS));
static RE_SEARCH: LazyLock<Regex> = LazyLock::new(|| word_list_regex(SEARCH_TOOLS));

fn tokens(command: &str) -> impl Iterator<Item = String> + '_ {
    command
        .split(|c: char| c.is_whitespace() || "/\\:;,|&=()'\"`@<>".contains(c))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

pub fn is_build_command(command: &str) -> bool {
    RE_BUILD.is_match(command)
}

pub fn is_test_command(command: &str) -> bool {
    tokens(command).any(|t| TEST_RUNNERS.contains(&t.as_str()))
}

static RE_LINT: LazyLock<Regex> = LazyLock::new(|| {
    let names: Vec<&str> = LINTERS.iter().map(|(name, _)| *name).collect();
    word_list_regex(&names)
});

/// Report label of the first linter named in `command`. Git invocations never
/// classify as lint runs.
pub fn linter_label(command: &str) -> Option<&'static str> {
    if is_git_command(command) {
        return None;
    }
    let caps = RE_LINT.captures(command)?;
    let name = caps[1].to_ascii_lowercase();
    LINTERS.iter().find(|(n, _)| *n == name).map(|(_, label)| *label)
}

pub fn is_git_command(command: &str) -> bool {
    let mut parts = command.split_whitespace();
    matches!(parts.next(), Some(first) if first.eq_ignore_ascii_case("git"))
}

pub fn is_search_command(command: &str) -> bool {
    RE_SEARCH.is_match(command)
}
