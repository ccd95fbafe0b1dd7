//! Text-level amalgamation of C/C++ header + implementation pairs into
//! single-header artifacts

pub mod assemble;
pub mod banner;
pub mod error;
pub mod guard;
pub mod includes;
pub mod lines;
pub mod module;
pub mod provenance;
pub mod verify;

pub use assemble::{Assembler, Composition, InteropOptions};
pub use error::{AmalgamError, Result};
pub use module::SourceModule;
pub use provenance::{GitCli, Provenance, RevisionInfo, RevisionSource};
