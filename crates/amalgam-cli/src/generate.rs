//! Invocation driver: read module files, assemble every target, write the
//! artifacts
//!
//! A run is all-or-nothing. Every artifact is assembled and verified in
//! memory before anything touches the disk. Writing then happens in two
//! passes: every artifact is staged in a temporary file in its destination
//! directory, and only then is each one persisted over its target path. A
//! rename failing midway through the second pass is the one way to end up
//! with a partially replaced set.

use crate::manifest::{Manifest, ModulePaths, TargetConfig};
use amalgam_core::provenance::without_provenance;
use amalgam_core::{Assembler, Composition, InteropOptions, Provenance, SourceModule};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// One assembled artifact, not yet on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub name: String,
    pub path: PathBuf,
    pub content: String,
}

/// Why an on-disk artifact no longer matches its inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    Missing,
    Differs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleArtifact {
    pub name: String,
    pub path: PathBuf,
    pub staleness: Staleness,
}

pub struct Generator<'a> {
    root: PathBuf,
    manifest: &'a Manifest,
    provenance: &'a Provenance,
}

impl<'a> Generator<'a> {
    pub fn new(
        root: impl Into<PathBuf>,
        manifest: &'a Manifest,
        provenance: &'a Provenance,
    ) -> Self {
        Self {
            root: root.into(),
            manifest,
            provenance,
        }
    }

    fn assembler(&self) -> Assembler<'a> {
        Assembler::new(self.provenance, self.manifest.settings.switch.clone())
            .with_regenerate_command(self.manifest.settings.regenerate_command.clone())
    }

    /// Read a module's header and implementation from the project root
    pub fn load_module(&self, paths: &ModulePaths) -> Result<SourceModule> {
        let header_path = self.root.join(&paths.header);
        let source_path = self.root.join(&paths.source);
        let header = std::fs::read_to_string(&header_path)
            .with_context(|| format!("Failed to read header: {:?}", header_path))?;
        let source = std::fs::read_to_string(&source_path)
            .with_context(|| format!("Failed to read source: {:?}", source_path))?;
        Ok(SourceModule::new(
            file_name(&paths.header)?,
            header,
            file_name(&paths.source)?,
            source,
        ))
    }

    fn composition(&self, target: &TargetConfig) -> Result<Composition> {
        Ok(match target {
            TargetConfig::Single { module, .. } => Composition::Single(self.load_module(module)?),
            TargetConfig::Nested { outer, inner, .. } => Composition::Nested {
                outer: self.load_module(outer)?,
                inner: self.load_module(inner)?,
            },
            TargetConfig::InteropSafe {
                outer,
                inner,
                indicator,
                language,
                plain_language,
                ..
            } => Composition::InteropSafe {
                outer: self.load_module(outer)?,
                inner: self.load_module(inner)?,
                options: InteropOptions {
                    indicator: indicator.clone(),
                    language: language.clone(),
                    plain_language: plain_language.clone(),
                },
            },
        })
    }

    pub fn render(&self, target: &TargetConfig) -> Result<RenderedArtifact> {
        let name = target.output().to_string();
        let composition = self.composition(target)?;
        let content = self
            .assembler()
            .assemble(&name, &composition)
            .with_context(|| format!("Failed to generate {}", name))?;
        info!(
            "Assembled {} from {} module(s) ({} bytes)",
            name,
            target.modules().len(),
            content.len()
        );

        Ok(RenderedArtifact {
            path: self.manifest.output_path(&self.root, target),
            name,
            content,
        })
    }

    /// Assemble every target, stopping at the first failure
    pub fn render_all(&self) -> Result<Vec<RenderedArtifact>> {
        self.manifest
            .targets
            .iter()
            .map(|target| {
                println!("Generating {}...", target.output());
                self.render(target)
            })
            .collect()
    }

    /// Stage every artifact, then persist them all
    pub fn write_all(&self, artifacts: &[RenderedArtifact]) -> Result<()> {
        let staged = artifacts
            .iter()
            .map(|artifact| {
                stage(&artifact.path, &artifact.content)
                    .with_context(|| format!("Failed to write {}", artifact.name))
                    .map(|temp| (artifact, temp))
            })
            .collect::<Result<Vec<_>>>()?;
        debug!("Staged {} artifacts", staged.len());

        for (artifact, temp) in staged {
            temp.persist(&artifact.path)
                .map_err(|e| e.error)
                .with_context(|| format!("Failed to replace {:?}", artifact.path))?;
            println!("  -> {}", artifact.path.display());
        }
        Ok(())
    }

    /// Regenerate everything: render all, then write all
    pub fn run(&self) -> Result<Vec<RenderedArtifact>> {
        let artifacts = self.render_all()?;
        self.write_all(&artifacts)?;
        info!("Generated {} artifacts", artifacts.len());
        Ok(artifacts)
    }

    /// Compare freshly rendered artifacts with what is on disk, ignoring
    /// provenance lines
    pub fn check(&self, artifacts: &[RenderedArtifact]) -> Result<Vec<StaleArtifact>> {
        let mut stale = Vec::new();
        for artifact in artifacts {
            let staleness = if !artifact.path.exists() {
                Some(Staleness::Missing)
            } else {
                let existing = std::fs::read_to_string(&artifact.path)
                    .with_context(|| format!("Failed to read artifact: {:?}", artifact.path))?;
                (without_provenance(&existing) != without_provenance(&artifact.content))
                    .then_some(Staleness::Differs)
            };

            match staleness {
                Some(staleness) => stale.push(StaleArtifact {
                    name: artifact.name.clone(),
                    path: artifact.path.clone(),
                    staleness,
                }),
                None => debug!("{} is up to date", artifact.name),
            }
        }
        Ok(stale)
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .with_context(|| format!("Module path has no file name: {:?}", path))
}

/// Write `content` to a synced temporary file next to `path`. Dropping the
/// returned handle removes it.
fn stage(path: &Path, content: &str) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {:?}", dir))?;

    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    Ok(temp)
}
