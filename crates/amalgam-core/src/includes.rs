//! Removal of local `#include "..."` directives
//!
//! Once a header is merged into an artifact, any `#include` that quotes it
//! is redundant. The pruner removes lines that consist of such a directive,
//! optionally followed by a `//` or `/* */` comment such as `// NOLINT`.
//! It is a pattern replacement over the whole text and ignores conditional
//! compilation context.

use crate::error::Result;
use regex::Regex;

#[derive(Debug, Clone)]
pub struct IncludePruner {
    pattern: Option<Regex>,
}

impl IncludePruner {
    /// Build a pruner for the given local interface names (e.g. `robots.h`)
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();

        let pattern = if names.is_empty() {
            None
        } else {
            let alternatives = names
                .iter()
                .map(|name| regex::escape(name))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(
                r#"(?m)^[ \t]*#[ \t]*include[ \t]*"(?:{alternatives})"[ \t]*(?://[^\r\n]*|/\*[^\r\n]*?\*/[ \t]*)?(?:\r?\n|\z)"#
            ))?)
        };

        Ok(Self { pattern })
    }

    pub fn prune(&self, text: &str) -> String {
        match &self.pattern {
            Some(pattern) => pattern.replace_all(text, "").into_owned(),
            None => text.to_string(),
        }
    }

    /// Number of directive lines `prune` would remove
    pub fn count(&self, text: &str) -> usize {
        self.pattern
            .as_ref()
            .map_or(0, |pattern| pattern.find_iter(text).count())
    }
}
