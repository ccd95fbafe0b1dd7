//! A library module: one public header plus one implementation file

/// Header and implementation text of one module, as read from disk.
///
/// The names are the file names other files use to `#include` the header
/// and to label the implementation in generated markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceModule {
    header_name: String,
    header: String,
    source_name: String,
    source: String,
}

impl SourceModule {
    pub fn new(
        header_name: impl Into<String>,
        header: impl Into<String>,
        source_name: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            header_name: header_name.into(),
            header: header.into(),
            source_name: source_name.into(),
            source: source.into(),
        }
    }

    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Copy with `\r\n` line endings rewritten to `\n`
    pub fn with_lf_endings(&self) -> SourceModule {
        SourceModule {
            header_name: self.header_name.clone(),
            header: self.header.replace("\r\n", "\n"),
            source_name: self.source_name.clone(),
            source: self.source.replace("\r\n", "\n"),
        }
    }
}
