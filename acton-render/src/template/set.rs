//! Parsed template sets and the handles that point into them

use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use minijinja::Environment;
use serde::Serialize;

use super::{is_template_file, TemplateSource};
use crate::error::TemplateError;

/// Name of the root template set that directory parses are registered under
pub const ROOT_SET_NAME: &str = "app";

/// A collection of templates parsed as one unit
///
/// Templates in the same set can reference each other by name. A set is
/// immutable once built; share it with `Arc` and hand out [`TemplateHandle`]s.
pub struct TemplateSet {
    name: &'static str,
    env: Environment<'static>,
    names: Vec<String>,
}

impl TemplateSet {
    /// Create an empty set
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);

        Self {
            name,
            env,
            names: Vec::new(),
        }
    }

    /// Parse every template file in `dir` into one set
    ///
    /// Entries are filtered with [`is_template_file`] and parsed in name
    /// order. A single unreadable or unparsable file fails the whole set.
    pub fn parse_dir<S>(source: &S, dir: &Path) -> Result<Self, TemplateError>
    where
        S: TemplateSource + ?Sized,
    {
        let mut files = source
            .list(dir)
            .map_err(|source| TemplateError::DirectoryRead {
                dir: dir.to_path_buf(),
                source,
            })?;
        files.retain(|name| is_template_file(name));
        files.sort();

        let mut set = Self::new(ROOT_SET_NAME);
        for name in files {
            let path = dir.join(&name);
            let contents = source
                .read(&path)
                .map_err(|source| TemplateError::FileRead { path, source })?;
            set.insert(name, contents)?;
        }

        tracing::trace!(
            set = ROOT_SET_NAME,
            dir = %dir.display(),
            templates = set.len(),
            "Parsed template set"
        );
        Ok(set)
    }

    /// Compile a template into the set under `name`
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        source: impl Into<Cow<'static, str>>,
    ) -> Result<(), TemplateError> {
        let name = name.into();
        self.env
            .add_template_owned(name.clone(), source.into())
            .map_err(|source| TemplateError::Parse {
                name: name.clone(),
                source,
            })?;

        if !self.names.contains(&name) {
            self.names.push(name);
        }
        Ok(())
    }

    /// Name of the set
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Names of all templates in the set, in parse order
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether the set contains `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Number of templates in the set
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the set holds no templates
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve `name` within a shared set
    pub fn lookup(self: &Arc<Self>, name: &str) -> Result<TemplateHandle, TemplateError> {
        if !self.contains(name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }

        Ok(TemplateHandle {
            set: Arc::clone(self),
            name: name.to_string(),
        })
    }
}

impl fmt::Debug for TemplateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateSet")
            .field("name", &self.name)
            .field("templates", &self.names)
            .finish()
    }
}

/// A resolved, executable template
///
/// Cheap to clone: the handle shares the set it was resolved from.
#[derive(Clone)]
pub struct TemplateHandle {
    set: Arc<TemplateSet>,
    name: String,
}

impl TemplateHandle {
    /// Build a handle over a single template compiled from `source`
    ///
    /// Useful for [`TemplateDescriptor::Direct`](super::TemplateDescriptor)
    /// when a handler carries its template inline.
    pub fn from_source(
        name: impl Into<String>,
        source: impl Into<Cow<'static, str>>,
    ) -> Result<Self, TemplateError> {
        let name = name.into();
        let mut set = TemplateSet::new(ROOT_SET_NAME);
        set.insert(name.clone(), source)?;
        Arc::new(set).lookup(&name)
    }

    /// Template name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set this template belongs to
    #[must_use]
    pub const fn set(&self) -> &Arc<TemplateSet> {
        &self.set
    }

    /// Whether both handles were resolved from the same parsed set
    #[must_use]
    pub fn shares_set_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.set, &other.set)
    }

    /// Execute the template against `data`
    pub fn render(&self, data: impl Serialize) -> Result<String, TemplateError> {
        self.set
            .env
            .get_template(&self.name)
            .and_then(|template| template.render(data))
            .map_err(|source| TemplateError::Render {
                name: self.name.clone(),
                source,
            })
    }
}

impl fmt::Debug for TemplateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateHandle")
            .field("set", &self.set.name)
            .field("name", &self.name)
            .finish()
    }
}
