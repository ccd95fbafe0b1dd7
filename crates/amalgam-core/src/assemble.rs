//! Single-header artifact assembly
//!
//! Three compositions are supported:
//!
//! - **Single**: one header plus its implementation, gated by the opt-in
//!   switch and spliced before the header's final `#endif`.
//! - **Nested**: an inner module's guard-free header embedded right after
//!   the outer header's `#define` guard, with both implementations (inner
//!   first) in the outer's implementation block.
//! - **Interop-safe**: like nested, but the embedded header and the
//!   implementation are only visible under a calling-convention indicator
//!   such as `__cplusplus`, so plain consumers see just the outer surface.
//!
//! Inputs are normalised to `\n` before assembly. An artifact uses `\r\n`
//! throughout when its primary header does.

use crate::banner::{banner_end, extract_implementation};
use crate::error::{AmalgamError, Result};
use crate::guard::{find_closing_directive, find_guard_pair, strip_guards, ClosingMatch};
use crate::includes::IncludePruner;
use crate::module::SourceModule;
use crate::provenance::Provenance;
use crate::verify::verify_artifact;
use tracing::debug;

/// Command named in the generated "do not edit" notice
pub const DEFAULT_REGENERATE_COMMAND: &str = "amalgamate";

const RULE: &str =
    "// ============================================================================";

/// Calling convention that gates the richer embedded content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteropOptions {
    /// Macro defined only under the richer convention
    pub indicator: String,
    /// Display name of the richer language
    pub language: String,
    /// Display name of the plain, convention-neutral language
    pub plain_language: String,
}

impl Default for InteropOptions {
    fn default() -> Self {
        Self {
            indicator: "__cplusplus".to_string(),
            language: "C++".to_string(),
            plain_language: "C".to_string(),
        }
    }
}

/// Which modules go into one artifact, and how
#[derive(Debug, Clone)]
pub enum Composition {
    Single(SourceModule),
    Nested {
        outer: SourceModule,
        inner: SourceModule,
    },
    InteropSafe {
        outer: SourceModule,
        inner: SourceModule,
        options: InteropOptions,
    },
}

impl Composition {
    /// Module whose header frames the artifact
    pub fn primary(&self) -> &SourceModule {
        match self {
            Composition::Single(module) => module,
            Composition::Nested { outer, .. } | Composition::InteropSafe { outer, .. } => outer,
        }
    }

    /// Same composition with every module's line endings normalised to `\n`
    pub fn with_lf_endings(&self) -> Composition {
        match self {
            Composition::Single(module) => Composition::Single(module.with_lf_endings()),
            Composition::Nested { outer, inner } => Composition::Nested {
                outer: outer.with_lf_endings(),
                inner: inner.with_lf_endings(),
            },
            Composition::InteropSafe {
                outer,
                inner,
                options,
            } => Composition::InteropSafe {
                outer: outer.with_lf_endings(),
                inner: inner.with_lf_endings(),
                options: options.clone(),
            },
        }
    }

    /// File names of every header merged into the artifact
    pub fn merged_headers(&self) -> Vec<&str> {
        match self {
            Composition::Single(module) => vec![module.header_name()],
            Composition::Nested { outer, inner } | Composition::InteropSafe { outer, inner, .. } => {
                vec![outer.header_name(), inner.header_name()]
            }
        }
    }
}

enum Body<'b> {
    Plain(&'b str),
    Sections(Vec<(&'b str, &'b str)>),
}

pub struct Assembler<'a> {
    provenance: &'a Provenance,
    switch: String,
    regenerate_command: String,
}

impl<'a> Assembler<'a> {
    /// `switch` is the macro consumers define to compile the implementation
    pub fn new(provenance: &'a Provenance, switch: impl Into<String>) -> Self {
        Self {
            provenance,
            switch: switch.into(),
            regenerate_command: DEFAULT_REGENERATE_COMMAND.to_string(),
        }
    }

    pub fn with_regenerate_command(mut self, command: impl Into<String>) -> Self {
        self.regenerate_command = command.into();
        self
    }

    /// Render `composition` and verify the result before handing it out
    pub fn assemble(&self, artifact: &str, composition: &Composition) -> Result<String> {
        let crlf = composition.primary().header().contains("\r\n");
        let normalized = composition.with_lf_endings();
        let text = match &normalized {
            Composition::Single(module) => self.single(artifact, module)?,
            Composition::Nested { outer, inner } => self.embed(artifact, outer, inner, None)?,
            Composition::InteropSafe {
                outer,
                inner,
                options,
            } => self.embed(artifact, outer, inner, Some(options))?,
        };
        verify_artifact(artifact, &text, &normalized.merged_headers())?;

        if crlf {
            debug!("Rendering {} with CRLF line endings", artifact);
            Ok(text.replace('\n', "\r\n"))
        } else {
            Ok(text)
        }
    }

    fn single(&self, artifact: &str, module: &SourceModule) -> Result<String> {
        let pruner = IncludePruner::new([module.header_name()])?;
        log_pruned(&pruner, module);
        let header = pruner.prune(module.header());
        let body = extract_implementation(&pruner.prune(module.source()));

        let mut lines = to_lines(&header);
        let closing = find_closing_directive(&lines, ClosingMatch::AnyDirective).ok_or_else(
            || AmalgamError::MissingClosingGuard {
                module: module.header_name().to_string(),
            },
        )?;
        debug!(
            "Splicing implementation of {} before line {}",
            module.source_name(),
            closing + 1
        );

        let block = self.implementation_block(artifact, Body::Plain(&body), None);
        lines.splice(closing..closing, block);
        Ok(self.finish(lines))
    }

    fn embed(
        &self,
        artifact: &str,
        outer: &SourceModule,
        inner: &SourceModule,
        interop: Option<&InteropOptions>,
    ) -> Result<String> {
        let pruner = IncludePruner::new([outer.header_name(), inner.header_name()])?;
        log_pruned(&pruner, outer);
        log_pruned(&pruner, inner);
        let outer_header = pruner.prune(outer.header());
        let interior = strip_guards(&pruner.prune(inner.header()));
        let inner_body = extract_implementation(&pruner.prune(inner.source()));
        let outer_body = extract_implementation(&pruner.prune(outer.source()));

        let mut lines = to_lines(&outer_header);
        let pair = find_guard_pair(&lines).ok_or_else(|| AmalgamError::MissingOpeningGuard {
            module: outer.header_name().to_string(),
        })?;

        // An interop-safe header closes its extern "C" wrapper with another
        // #endif, so only the one naming the guard will do.
        let closing = match interop {
            None => find_closing_directive(&lines, ClosingMatch::AnyDirective)
                .filter(|&index| index > pair.define_line)
                .ok_or_else(|| AmalgamError::MissingClosingGuard {
                    module: outer.header_name().to_string(),
                })?,
            Some(_) => find_closing_directive(&lines, ClosingMatch::Guard(&pair.identifier))
                .filter(|&index| index > pair.define_line)
                .ok_or_else(|| AmalgamError::MissingNamedClosingGuard {
                    module: outer.header_name().to_string(),
                    identifier: pair.identifier.clone(),
                })?,
        };
        debug!(
            "Embedding {} at line {} of {}, closing guard {} at line {}",
            inner.header_name(),
            pair.anchor() + 1,
            outer.header_name(),
            pair.identifier,
            closing + 1
        );

        let block = self.implementation_block(
            artifact,
            Body::Sections(vec![
                (inner.source_name(), inner_body.as_str()),
                (outer.source_name(), outer_body.as_str()),
            ]),
            interop,
        );
        // Closing splice first: it lies after the anchor.
        lines.splice(closing..closing, block);

        let anchor = pair.anchor();
        lines.splice(
            anchor..anchor,
            embedded_section(inner.header_name(), &interior, interop),
        );

        Ok(self.finish(lines))
    }

    fn implementation_block(
        &self,
        artifact: &str,
        body: Body<'_>,
        interop: Option<&InteropOptions>,
    ) -> Vec<String> {
        let [generated, commit] = self.provenance.comment_lines();
        let switch = &self.switch;

        let mut block = vec![String::new(), RULE.to_string()];
        block.push(match interop {
            None => "// IMPLEMENTATION".to_string(),
            Some(options) => format!(
                "// IMPLEMENTATION ({} required for implementation)",
                options.language
            ),
        });
        block.push(RULE.to_string());
        block.push(generated);
        block.push(commit);
        block.push("//".to_string());

        let unit = interop
            .map(|options| format!("{} ", options.language))
            .unwrap_or_default();
        block.push(format!(
            "// Define {switch} in exactly one {unit}source file before including"
        ));
        block.push("// this header to include the implementation:".to_string());
        block.push("//".to_string());
        block.push(format!("//   #define {switch}"));
        block.push(format!("//   #include \"{artifact}\""));
        block.push("//".to_string());
        if let Some(options) = interop {
            block.push(format!(
                "// Note: The implementation requires {}, but the API can be called from {}.",
                options.language, options.plain_language
            ));
        }
        block.push(RULE.to_string());
        block.push(String::new());

        block.push(match interop {
            None => format!("#ifdef {switch}"),
            Some(options) => format!("#if defined({switch}) && defined({})", options.indicator),
        });
        block.push(String::new());

        match body {
            Body::Plain(text) => {
                block.push(text.to_string());
                block.push(String::new());
            }
            Body::Sections(sections) => {
                for (name, text) in sections {
                    block.push(format!("// === Begin {name} implementation ==="));
                    block.push(text.to_string());
                    block.push(format!("// === End {name} implementation ==="));
                    block.push(String::new());
                }
            }
        }

        block.push(match interop {
            None => format!("#endif  // {switch}"),
            Some(options) => format!("#endif  // {switch} && {}", options.indicator),
        });
        block.push(String::new());
        block.push(String::new());
        block
    }

    fn notice(&self) -> Vec<String> {
        let [generated, commit] = self.provenance.comment_lines();
        vec![
            "//".to_string(),
            "// *** AMALGAMATED SINGLE-HEADER VERSION ***".to_string(),
            generated,
            commit,
            "//".to_string(),
            "// This file is auto-generated. Do not edit directly.".to_string(),
            format!("// Run: {}", self.regenerate_command),
            "//".to_string(),
            String::new(),
        ]
    }

    /// Insert the notice after the leading banner and join
    fn finish(&self, mut lines: Vec<String>) -> String {
        let at = banner_end(&lines);
        lines.splice(at..at, self.notice());
        lines.join("\n")
    }
}

fn embedded_section(
    header_name: &str,
    interior: &str,
    interop: Option<&InteropOptions>,
) -> Vec<String> {
    match interop {
        None => vec![
            String::new(),
            format!("// === Begin embedded {header_name} ==="),
            interior.to_string(),
            format!("// === End embedded {header_name} ==="),
            String::new(),
        ],
        Some(options) => vec![
            String::new(),
            format!("#ifdef {}", options.indicator),
            format!(
                "// === Begin embedded {header_name} ({} only) ===",
                options.language
            ),
            interior.to_string(),
            format!("// === End embedded {header_name} ==="),
            format!("#endif  // {}", options.indicator),
            String::new(),
        ],
    }
}

fn log_pruned(pruner: &IncludePruner, module: &SourceModule) {
    debug!(
        "Pruned {} local includes from {} and {} from {}",
        pruner.count(module.header()),
        module.header_name(),
        pruner.count(module.source()),
        module.source_name()
    );
}

fn to_lines(text: &str) -> Vec<String> {
    text.split('\n').map(String::from).collect()
}
