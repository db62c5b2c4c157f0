//! Template manager that parses once and caches forever

use std::path::Path;
use std::sync::Arc;

use super::{EmbeddedFiles, TemplateHandle, TemplateManager, TemplateSet, TemplateSource};
use crate::error::TemplateError;

/// Parses a template directory once and serves lookups from the cached set
///
/// Construction reads and parses every template; failures are returned to
/// startup code. After that the set is immutable and lookups can only fail
/// with [`TemplateError::NotFound`].
#[derive(Debug, Clone)]
pub struct EmbeddedTemplateManager {
    templates: Arc<TemplateSet>,
}

impl EmbeddedTemplateManager {
    /// Parse `src_dir` out of files compiled into the binary
    pub fn new(files: &EmbeddedFiles, src_dir: impl AsRef<Path>) -> Result<Self, TemplateError> {
        Self::from_source(files, src_dir)
    }

    /// Parse `src_dir` out of any template source
    ///
    /// With [`DiskFiles`](super::DiskFiles) this takes a one-off snapshot of
    /// an on-disk directory.
    pub fn from_source<S>(source: &S, src_dir: impl AsRef<Path>) -> Result<Self, TemplateError>
    where
        S: TemplateSource + ?Sized,
    {
        let src_dir = src_dir.as_ref();
        let templates = TemplateSet::parse_dir(source, src_dir).inspect_err(|err| {
            tracing::error!(dir = %src_dir.display(), "Failed to initialize templates: {err}");
        })?;

        tracing::debug!(
            dir = %src_dir.display(),
            templates = templates.len(),
            "Template set cached"
        );
        Ok(Self {
            templates: Arc::new(templates),
        })
    }

    /// The cached template set
    #[must_use]
    pub const fn templates(&self) -> &Arc<TemplateSet> {
        &self.templates
    }
}

impl TemplateManager for EmbeddedTemplateManager {
    fn lookup_template(&self, name: &str) -> Result<TemplateHandle, TemplateError> {
        self.templates.lookup(name)
    }
}
