//! Character-budget truncation for command output that is still too long
//! after the domain scanners ran.

use crate::technique::Technique;
use oc_core::TechniqueKind;

/// Middle-omission: keep the first and last `max_chars / 2` characters with a
/// marker line between them. `None` when the text fits.
pub fn truncate(text: &str, max_chars: usize) -> Option<String> {
    if text.len() <= max_chars {
        return None;
    }
    let total = text.chars().count();
    if total <= max_chars {
        return None;
    }

    let half = max_chars / 2;
    let head_end = text.char_indices().nth(half).map_or(text.len(), |(i, _)| i);
    let tail_start = text.char_indices().nth(total - half).map_or(text.len(), |(i, _)| i);
    let omitted = total - 2 * half;

    Some(format!(
        "{}\n... [{omitted} chars truncated] ...\n{}",
        &text[..head_end],
        &text[tail_start..]
    ))
}

#[derive(Debug, Clone, Copy)]
pub struct OutputTruncator {
    max_chars: usize,
}

impl OutputTruncator {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl Technique for OutputTruncator {
    fn kind(&self) -> TechniqueKind {
        TechniqueKind::Truncate
    }

    fn apply(&self, text: &str, _command: Option<&str>) -> Option<String> {
        truncate(text, self.max_chars)
    }
}
