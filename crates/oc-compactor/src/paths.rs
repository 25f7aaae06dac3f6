//! Path compaction shared by the search grouper and the linter report.

const MAX_PATH_LEN: usize = 50;
const MIN_SEGMENTS: usize = 4;

/// Collapse the middle of a long path: `first/.../parent/file`.
///
/// Paths of at most 50 characters, or with fewer than four segments, are
/// returned unchanged.
pub fn compact_path(path: &str) -> String {
    if path.len() <= MAX_PATH_LEN {
        return path.to_string();
    }
    let segments: Vec<&str> = path.split(['/', '\\']).filter(|s| !s.is_empty()).collect();
    if segments.len() < MIN_SEGMENTS {
        return path.to_string();
    }
    let n = segments.len();
    format!("{}/.../{}/{}", segments[0], segments[n - 2], segments[n - 1])
}
