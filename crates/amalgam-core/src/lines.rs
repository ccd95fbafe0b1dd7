//! Line classification for preprocessor-shaped text
//!
//! The amalgamator never parses the languages it merges. Every structural
//! decision is made by one of the predicates in this module, applied to a
//! single line at a time:
//!
//! - [`opening_guard`] recognises `#ifndef IDENT`
//! - [`defines_guard`] recognises `#define IDENT` for a given identifier
//! - [`is_closing_directive`] / [`closes_guard`] recognise `#endif`
//! - [`include_target`] extracts the quoted name of `#include "name"`
//! - [`is_banner_line`] recognises the blank and `//` lines of a file banner
//!
//! Whitespace between `#` and the keyword is tolerated, as is a trailing
//! comment after a guard identifier.

/// Blank or whitespace-only line
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Line whose first non-whitespace characters are `//`
pub fn is_line_comment(line: &str) -> bool {
    line.trim_start().starts_with("//")
}

/// Line that belongs to a leading license/file banner
pub fn is_banner_line(line: &str) -> bool {
    is_blank(line) || is_line_comment(line)
}

/// Split a directive line into its keyword and the remainder.
///
/// `#  ifndef FOO  // bar` yields `("ifndef", "FOO  // bar")`.
fn directive(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim().strip_prefix('#')?.trim_start();
    let end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    Some((&rest[..end], rest[end..].trim()))
}

/// Leading C identifier of `text`, with whatever follows it
fn leading_identifier(text: &str) -> Option<(&str, &str)> {
    let starts_ok = text
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_ok {
        return None;
    }
    let end = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    Some((&text[..end], text[end..].trim()))
}

fn is_empty_or_comment(text: &str) -> bool {
    text.is_empty() || text.starts_with("//") || text.starts_with("/*")
}

/// Identifier of an `#ifndef IDENT` line.
///
/// Lines carrying anything but a comment after the identifier are not
/// guard openers.
pub fn opening_guard(line: &str) -> Option<&str> {
    let (keyword, rest) = directive(line)?;
    if keyword != "ifndef" {
        return None;
    }
    let (ident, tail) = leading_identifier(rest)?;
    is_empty_or_comment(tail).then_some(ident)
}

/// `#define IDENT` with no replacement text
pub fn defines_guard(line: &str, identifier: &str) -> bool {
    match directive(line) {
        Some(("define", rest)) => match leading_identifier(rest) {
            Some((ident, tail)) => ident == identifier && is_empty_or_comment(tail),
            None => false,
        },
        _ => false,
    }
}

/// Any `#endif` line
pub fn is_closing_directive(line: &str) -> bool {
    matches!(directive(line), Some(("endif", _)))
}

/// `#endif` line whose text mentions `identifier`.
///
/// This is a substring test, not a parse: an `#endif` whose trailing comment
/// merely contains the identifier as part of a longer token also matches.
/// Callers rely on guard identifiers being distinctive.
pub fn closes_guard(line: &str, identifier: &str) -> bool {
    is_closing_directive(line) && line.contains(identifier)
}

/// Quoted name of an `#include "name"` line.
///
/// Angle-bracket includes are system headers and never local.
pub fn include_target(line: &str) -> Option<&str> {
    let (keyword, rest) = directive(line)?;
    if keyword != "include" {
        return None;
    }
    let quoted = rest.strip_prefix('"')?;
    let end = quoted.find('"')?;
    Some(&quoted[..end])
}
