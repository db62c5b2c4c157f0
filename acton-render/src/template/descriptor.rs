//! Which template a page handler wants rendered

use super::TemplateHandle;

/// A handler's choice of template
///
/// Either a name resolved through the [`TemplateManager`](super::TemplateManager)
/// at render time, or a handle the handler already resolved itself.
#[derive(Debug, Clone)]
pub enum TemplateDescriptor {
    /// Look the template up by name
    Named(String),
    /// Render this template directly, skipping lookup
    Direct(TemplateHandle),
}

impl TemplateDescriptor {
    /// Describe a template by name
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Describe an already-resolved template
    #[must_use]
    pub const fn direct(handle: TemplateHandle) -> Self {
        Self::Direct(handle)
    }

    /// Name of the described template
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Direct(handle) => handle.name(),
        }
    }
}

impl From<TemplateHandle> for TemplateDescriptor {
    fn from(handle: TemplateHandle) -> Self {
        Self::Direct(handle)
    }
}

impl From<&str> for TemplateDescriptor {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for TemplateDescriptor {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}
