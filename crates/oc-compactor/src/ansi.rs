//! ANSI escape removal.

use crate::technique::Technique;
use oc_core::TechniqueKind;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

const ESC: char = '\x1b';

// Alternation is leftmost-first: full sequences before the lone-ESC fallback,
// so the output never contains an ESC byte.
static RE_ESCAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(concat!(
    r"\x1b\[[0-?]*[ -/]*[@-~]",                   // CSI
    r"|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)",        // OSC
    r"|\x1b[PX^_][^\x07\x1b]*(?:\x07|\x1b\\)",    // DCS / SOS / PM / APC
    r"|\x1b[()*+][0-9A-Za-z]",                    // charset designation
    r"|\x1b[@-Z\\-_=>78]",                        // two-byte sequences
    r"|\x1b",
)).unwrap());

/// Remove escape sequences. Returns the input borrowed when it has no ESC byte.
pub fn strip(text: &str) -> Cow<'_, str> {
    if !text.contains(ESC) {
        return Cow::Borrowed(text);
    }
    RE_ESCAPE.replace_all(text, "")
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AnsiStripper;

impl Technique for AnsiStripper {
    fn kind(&self) -> TechniqueKind {
        TechniqueKind::AnsiStrip
    }

    fn apply(&self, text: &str, _command: Option<&str>) -> Option<String> {
        match strip(text) {
            Cow::Borrowed(_) => None,
            Cow::Owned(stripped) => Some(stripped),
        }
    }
}
