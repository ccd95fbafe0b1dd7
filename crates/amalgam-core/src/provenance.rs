//! Provenance stamped into generated artifacts
//!
//! A [`Provenance`] record is resolved once per invocation and handed to every
//! assembler by reference. Resolution never fails: when the version-control
//! query is unavailable the revision renders as `unknown` and the timestamp
//! falls back to the local wall clock.

use chrono::Local;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Placeholder rendered when no revision id is known
pub const UNKNOWN_REVISION: &str = "unknown";

/// Format of the wall-clock fallback timestamp
pub const FALLBACK_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const GENERATED_PREFIX: &str = "// Generated: ";
const COMMIT_PREFIX: &str = "// Commit: ";

/// What the version-control collaborator reports about the checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionInfo {
    pub short_id: Option<String>,
    pub committed_at: String,
}

/// Version-control collaborator. `None` means the information is absent.
pub trait RevisionSource {
    fn query(&self) -> Option<RevisionInfo>;
}

/// Queries the `git` executable inside a checkout
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn run(&self, args: &[&str]) -> Option<String> {
        let output = match Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                debug!("Failed to run git {:?}: {}", args, e);
                return None;
            }
        };

        if !output.status.success() {
            debug!("git {:?} exited with {}", args, output.status);
            return None;
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}

impl RevisionSource for GitCli {
    fn query(&self) -> Option<RevisionInfo> {
        let short_id = self.run(&["rev-parse", "--short", "HEAD"])?;
        let committed_at = self.run(&["log", "-1", "--format=%ci"])?;
        Some(RevisionInfo {
            short_id: Some(short_id),
            committed_at,
        })
    }
}

/// Revision and timestamp shared read-only by every assembler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    revision: Option<String>,
    timestamp: String,
}

impl Provenance {
    pub fn new(revision: Option<String>, timestamp: impl Into<String>) -> Self {
        Self {
            revision,
            timestamp: timestamp.into(),
        }
    }

    /// Ask the collaborator, degrading to the fallback on absence
    pub fn resolve(source: &dyn RevisionSource) -> Self {
        match source.query() {
            Some(info) => Self::new(info.short_id, info.committed_at),
            None => {
                warn!("Revision information unavailable, using current time");
                Self::fallback()
            }
        }
    }

    /// Unknown revision, current local time
    pub fn fallback() -> Self {
        Self::new(
            None,
            Local::now().format(FALLBACK_TIMESTAMP_FORMAT).to_string(),
        )
    }

    pub fn revision(&self) -> &str {
        self.revision.as_deref().unwrap_or(UNKNOWN_REVISION)
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// The `// Generated:` and `// Commit:` comment lines
    pub fn comment_lines(&self) -> [String; 2] {
        [
            format!("{}{}", GENERATED_PREFIX, self.timestamp),
            format!("{}{}", COMMIT_PREFIX, self.revision()),
        ]
    }
}

/// Drop provenance comment lines so artifacts from different runs compare
/// equal when their inputs were unchanged.
pub fn without_provenance(text: &str) -> String {
    text.split('\n')
        .filter(|line| !(line.starts_with(GENERATED_PREFIX) || line.starts_with(COMMIT_PREFIX)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<RevisionInfo>);

    impl RevisionSource for Fixed {
        fn query(&self) -> Option<RevisionInfo> {
            self.0.clone()
        }
    }

    #[test]
    fn test_resolve_from_source() {
        let source = Fixed(Some(RevisionInfo {
            short_id: Some("0e413cb".to_string()),
            committed_at: "2026-01-16 23:01:33 +0200".to_string(),
        }));
        let provenance = Provenance::resolve(&source);
        assert_eq!(provenance.revision(), "0e413cb");
        assert_eq!(provenance.timestamp(), "2026-01-16 23:01:33 +0200");
        assert_eq!(
            provenance.comment_lines(),
            [
                "// Generated: 2026-01-16 23:01:33 +0200".to_string(),
                "// Commit: 0e413cb".to_string()
            ]
        );
    }

    #[test]
    fn test_resolve_falls_back() {
        let provenance = Provenance::resolve(&Fixed(None));
        assert_eq!(provenance.revision(), UNKNOWN_REVISION);
        assert!(
            chrono::NaiveDateTime::parse_from_str(provenance.timestamp(), FALLBACK_TIMESTAMP_FORMAT)
                .is_ok(),
            "fallback timestamp should be wall-clock time: {}",
            provenance.timestamp()
        );
    }

    #[test]
    fn test_without_provenance() {
        let a = "// x\n// Generated: 1\n// Commit: abc\nint a;";
        let b = "// x\n// Generated: 2\n// Commit: unknown\nint a;";
        assert_eq!(without_provenance(a), "// x\nint a;");
        assert_eq!(without_provenance(a), without_provenance(b));
    }
}
