//! Library interface for the amalgamate CLI

pub mod generate;
pub mod manifest;

pub use generate::{Generator, RenderedArtifact, StaleArtifact, Staleness};
pub use manifest::{Manifest, ModulePaths, Settings, TargetConfig};
