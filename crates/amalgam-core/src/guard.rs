//! Include-guard location and removal

use crate::lines::{closes_guard, defines_guard, is_blank, is_closing_directive, opening_guard};
use tracing::debug;

/// Position of a header's `#ifndef` / `#define` guard pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPair {
    pub identifier: String,
    /// Line index of `#ifndef IDENT`
    pub open_line: usize,
    /// Line index of `#define IDENT`
    pub define_line: usize,
}

impl GuardPair {
    /// Line where content nested inside the guard should be spliced
    pub fn anchor(&self) -> usize {
        self.define_line + 1
    }
}

/// Which `#endif` lines count as the closing guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosingMatch<'a> {
    /// The last `#endif` of any kind
    AnyDirective,
    /// The last `#endif` whose text mentions this identifier
    Guard(&'a str),
}

impl ClosingMatch<'_> {
    fn matches(&self, line: &str) -> bool {
        match self {
            ClosingMatch::AnyDirective => is_closing_directive(line),
            ClosingMatch::Guard(identifier) => closes_guard(line, identifier),
        }
    }
}

/// Find the first `#ifndef IDENT` that is followed, with only blank lines
/// in between, by `#define IDENT`.
pub fn find_guard_pair<S: AsRef<str>>(lines: &[S]) -> Option<GuardPair> {
    for (open_line, line) in lines.iter().enumerate() {
        let Some(identifier) = opening_guard(line.as_ref()) else {
            continue;
        };
        let next = lines[open_line + 1..]
            .iter()
            .position(|l| !is_blank(l.as_ref()))
            .map(|offset| open_line + 1 + offset);
        if let Some(define_line) = next {
            if defines_guard(lines[define_line].as_ref(), identifier) {
                return Some(GuardPair {
                    identifier: identifier.to_string(),
                    open_line,
                    define_line,
                });
            }
        }
    }
    None
}

/// Reverse scan for the closing guard directive
pub fn find_closing_directive<S: AsRef<str>>(
    lines: &[S],
    which: ClosingMatch<'_>,
) -> Option<usize> {
    lines.iter().rposition(|line| which.matches(line.as_ref()))
}

/// Remove a header's guard pair and its trailing `#endif`, returning the
/// interior. Text without a guard pair is returned unchanged.
pub fn strip_guards(header: &str) -> String {
    let mut lines: Vec<&str> = header.split('\n').collect();
    let Some(pair) = find_guard_pair(&lines) else {
        debug!("No guard pair found, treating text as guard-free");
        return header.to_string();
    };
    debug!(
        "Stripping guard {} (lines {} and {})",
        pair.identifier, pair.open_line, pair.define_line
    );

    lines.remove(pair.define_line);
    lines.remove(pair.open_line);

    trim_trailing_blank(&mut lines);
    if lines.last().is_some_and(|line| is_closing_directive(line)) {
        lines.pop();
        trim_trailing_blank(&mut lines);
    }

    lines.join("\n")
}

fn trim_trailing_blank(lines: &mut Vec<&str>) {
    while lines.last().is_some_and(|line| is_blank(line)) {
        lines.pop();
    }
}
