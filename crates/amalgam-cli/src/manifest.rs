//! Target manifest: which single-header artifacts to generate from which
//! module files
//!
//! The manifest is a TOML file, `amalgamate.toml` at the project root by
//! default. Without one, the built-in robotstxt layout is used.

use amalgam_core::InteropOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name looked up in the project root when no manifest is given
pub const DEFAULT_MANIFEST: &str = "amalgamate.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to the project root) receiving the artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Macro consumers define to compile the embedded implementation
    #[serde(default = "default_switch")]
    pub switch: String,
    /// Command shown in the generated "do not edit" notice
    #[serde(default = "default_regenerate_command")]
    pub regenerate_command: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            switch: default_switch(),
            regenerate_command: default_regenerate_command(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("singleheader")
}

fn default_switch() -> String {
    "ROBOTS_IMPLEMENTATION".to_string()
}

fn default_regenerate_command() -> String {
    amalgam_core::assemble::DEFAULT_REGENERATE_COMMAND.to_string()
}

fn default_indicator() -> String {
    InteropOptions::default().indicator
}

fn default_language() -> String {
    InteropOptions::default().language
}

fn default_plain_language() -> String {
    InteropOptions::default().plain_language
}

/// Header/implementation paths of one module, relative to the project root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePaths {
    pub header: PathBuf,
    pub source: PathBuf,
}

impl ModulePaths {
    pub fn new(header: impl Into<PathBuf>, source: impl Into<PathBuf>) -> Self {
        Self {
            header: header.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TargetConfig {
    Single {
        output: String,
        module: ModulePaths,
    },
    Nested {
        output: String,
        outer: ModulePaths,
        inner: ModulePaths,
    },
    InteropSafe {
        output: String,
        outer: ModulePaths,
        inner: ModulePaths,
        #[serde(default = "default_indicator")]
        indicator: String,
        #[serde(default = "default_language")]
        language: String,
        #[serde(default = "default_plain_language")]
        plain_language: String,
    },
}

impl TargetConfig {
    /// Artifact file name inside the output directory
    pub fn output(&self) -> &str {
        match self {
            TargetConfig::Single { output, .. }
            | TargetConfig::Nested { output, .. }
            | TargetConfig::InteropSafe { output, .. } => output,
        }
    }

    pub fn modules(&self) -> Vec<&ModulePaths> {
        match self {
            TargetConfig::Single { module, .. } => vec![module],
            TargetConfig::Nested { outer, inner, .. }
            | TargetConfig::InteropSafe { outer, inner, .. } => vec![outer, inner],
        }
    }
}

impl Default for Manifest {
    /// The robotstxt distribution: plain C++ header, C API header and the
    /// reporting extension, each carrying the core parser.
    fn default() -> Self {
        let robots = ModulePaths::new("robots.h", "robots.cc");
        Self {
            settings: Settings::default(),
            targets: vec![
                TargetConfig::Single {
                    output: "robots.h".to_string(),
                    module: robots.clone(),
                },
                TargetConfig::InteropSafe {
                    output: "robots_c.h".to_string(),
                    outer: ModulePaths::new("bindings/c/robots_c.h", "bindings/c/robots_c.cc"),
                    inner: robots.clone(),
                    indicator: default_indicator(),
                    language: default_language(),
                    plain_language: default_plain_language(),
                },
                TargetConfig::Nested {
                    output: "reporting_robots.h".to_string(),
                    outer: ModulePaths::new("reporting_robots.h", "reporting_robots.cc"),
                    inner: robots,
                },
            ],
        }
    }
}

impl Manifest {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {:?}", path))?;
        let manifest: Manifest = toml::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
        manifest
            .validate()
            .with_context(|| format!("Invalid manifest: {:?}", path))?;
        Ok(manifest)
    }

    /// Load `explicit` if given, else `root/amalgamate.toml` if present,
    /// else the built-in layout.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Using manifest {:?}", path);
            return Self::from_file(path);
        }

        let candidate = root.join(DEFAULT_MANIFEST);
        if candidate.is_file() {
            info!("Using manifest {:?}", candidate);
            Self::from_file(&candidate)
        } else {
            debug!("No {} in {:?}, using built-in targets", DEFAULT_MANIFEST, root);
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            anyhow::bail!("manifest declares no targets");
        }
        if self.settings.switch.trim().is_empty() {
            anyhow::bail!("settings.switch must not be empty");
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            let output = target.output();
            if output.is_empty() || Path::new(output).file_name() != Some(OsStr::new(output)) {
                anyhow::bail!("target output {:?} must be a plain file name", output);
            }
            if !seen.insert(output) {
                anyhow::bail!("target output {:?} is declared twice", output);
            }
            for module in target.modules() {
                for path in [&module.header, &module.source] {
                    if path.file_name().is_none() {
                        anyhow::bail!(
                            "target {:?} names module path {:?} without a file name",
                            output,
                            path
                        );
                    }
                }
            }
            if let TargetConfig::Nested { outer, inner, .. }
            | TargetConfig::InteropSafe { outer, inner, .. } = target
            {
                if outer.header.file_name() == inner.header.file_name() {
                    anyhow::bail!(
                        "target {:?} nests a header named like its outer header",
                        output
                    );
                }
            }
        }
        Ok(())
    }

    pub fn output_path(&self, root: &Path, target: &TargetConfig) -> PathBuf {
        root.join(&self.settings.output_dir).join(target.output())
    }
}
