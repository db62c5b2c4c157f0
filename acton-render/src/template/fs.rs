//! Template manager that re-reads the directory on every lookup

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{DiskFiles, TemplateHandle, TemplateManager, TemplateSet};
use crate::error::TemplateError;

/// Re-parses a template directory on every lookup
///
/// Nothing is cached: each lookup lists the directory, parses every template
/// file and resolves the name in the fresh set. Edits, additions and removals
/// are visible on the next request, at the cost of directory I/O and parsing
/// per lookup. Meant for development.
#[derive(Debug, Clone)]
pub struct FsTemplateManager {
    src_dir: PathBuf,
}

impl FsTemplateManager {
    /// Serve templates from `src_dir`
    ///
    /// The directory is not touched until the first lookup.
    pub fn new(src_dir: impl Into<PathBuf>) -> Self {
        Self {
            src_dir: src_dir.into(),
        }
    }

    /// Directory templates are read from
    #[must_use]
    pub fn src_dir(&self) -> &Path {
        &self.src_dir
    }

    /// Parse the directory as it is right now
    pub fn parse(&self) -> Result<TemplateSet, TemplateError> {
        TemplateSet::parse_dir(&DiskFiles, &self.src_dir)
    }
}

impl TemplateManager for FsTemplateManager {
    fn lookup_template(&self, name: &str) -> Result<TemplateHandle, TemplateError> {
        let templates = Arc::new(self.parse()?);
        tracing::debug!(
            dir = %self.src_dir.display(),
            template = name,
            "Reparsed templates for lookup"
        );
        templates.lookup(name)
    }
}
