//! Leading banner detection
//!
//! Headers and sources open with a license/file banner made of `//` lines
//! and blank lines. The split point after that banner is where the
//! generated notice goes, and where an embedded implementation body starts.

use crate::lines::is_banner_line;

/// Index of the first line that is neither blank nor a `//` comment.
///
/// Returns `lines.len()` when every line belongs to the banner.
pub fn banner_end<S: AsRef<str>>(lines: &[S]) -> usize {
    lines
        .iter()
        .position(|line| !is_banner_line(line.as_ref()))
        .unwrap_or(lines.len())
}

/// Implementation body of a (pruned) source file: everything after its
/// leading banner. A file that is all banner yields an empty body.
pub fn extract_implementation(source: &str) -> String {
    let lines: Vec<&str> = source.split('\n').collect();
    let start = banner_end(&lines);
    lines[start..].join("\n")
}
