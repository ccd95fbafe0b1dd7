//! Structural checks on a finished artifact
//!
//! Every artifact must hold exactly one guard pair for its own identifier,
//! end (ignoring trailing comments) with a closing directive, and contain
//! no `#include` of a header that was merged into it.

use crate::error::{AmalgamError, Result};
use crate::guard::find_guard_pair;
use crate::lines::{defines_guard, include_target, is_banner_line, is_closing_directive, opening_guard};

pub fn verify_artifact<S: AsRef<str>>(
    artifact: &str,
    text: &str,
    merged_headers: &[S],
) -> Result<()> {
    let fail = |reason: String| AmalgamError::VerificationFailed {
        artifact: artifact.to_string(),
        reason,
    };
    let lines: Vec<&str> = text.split('\n').collect();

    let pair = find_guard_pair(&lines).ok_or_else(|| fail("no opening guard pair".to_string()))?;
    let identifier = pair.identifier.as_str();

    let openings = lines
        .iter()
        .filter(|line| opening_guard(line) == Some(identifier))
        .count();
    let defines = lines
        .iter()
        .filter(|line| defines_guard(line, identifier))
        .count();
    if openings != 1 || defines != 1 {
        return Err(fail(format!(
            "expected one guard pair for {identifier}, found {openings} #ifndef and {defines} #define"
        )));
    }

    match lines.iter().rposition(|line| !is_banner_line(line)) {
        Some(last) if last > pair.define_line && is_closing_directive(lines[last]) => {}
        _ => {
            return Err(fail(format!(
                "closing guard for {identifier} is not the last directive"
            )))
        }
    }

    for (index, line) in lines.iter().enumerate() {
        if let Some(target) = include_target(line) {
            if merged_headers.iter().any(|name| name.as_ref() == target) {
                return Err(fail(format!(
                    "line {} still includes merged header \"{}\"",
                    index + 1,
                    target
                )));
            }
        }
    }

    Ok(())
}
