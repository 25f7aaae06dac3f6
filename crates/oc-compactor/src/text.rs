//! Small string helpers shared by the scanners.

/// Cut `s` to at most `max` characters, ending in `...` when cut.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Sort `(name, count)` pairs by count descending, then name ascending.
pub fn rank_counts<K: Ord>(mut pairs: Vec<(K, usize)>) -> Vec<(K, usize)> {
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    pairs
}
