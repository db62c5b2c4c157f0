//! Template resolution
//!
//! A [`TemplateManager`] turns a template name into a renderable
//! [`TemplateHandle`]. Two strategies are provided:
//!
//! - [`EmbeddedTemplateManager`]: parses a directory once at startup and keeps
//!   the resulting [`TemplateSet`] for the life of the process
//! - [`FsTemplateManager`]: re-reads and re-parses the directory on every
//!   lookup, so edits show up without a restart
//!
//! Both read their files through a [`TemplateSource`]: [`EmbeddedFiles`] for
//! sources compiled into the binary, [`DiskFiles`] for the real filesystem.
//!
//! # Template layout
//!
//! Every file directly inside the source directory becomes one template named
//! after its file name. Files whose names contain `#` or `~` (editor backup
//! and swap files) are skipped. Templates in a set may `include`, `extend` or
//! `import` each other by name. Error pages are looked up as `<status>.html`,
//! e.g. `404.html`.
//!
//! # Example
//!
//! ```rust
//! use acton_render::template::{
//!     EmbeddedFile, EmbeddedFiles, EmbeddedTemplateManager, TemplateManager,
//! };
//!
//! static FILES: EmbeddedFiles = EmbeddedFiles::new(&[
//!     EmbeddedFile::new("templates/home.html", "<h1>Hello {{ user }}</h1>"),
//!     EmbeddedFile::new("templates/home.html~", "stale backup"),
//! ]);
//!
//! let templates = EmbeddedTemplateManager::new(&FILES, "templates").unwrap();
//! let home = templates.lookup_template("home.html").unwrap();
//! let html = home.render(minijinja::context! { user => "alice" }).unwrap();
//! assert_eq!(html, "<h1>Hello alice</h1>");
//!
//! assert!(templates.lookup_template("home.html~").is_err());
//! ```

mod descriptor;
mod embedded;
mod fs;
mod set;
mod source;

pub use descriptor::TemplateDescriptor;
pub use embedded::EmbeddedTemplateManager;
pub use fs::FsTemplateManager;
pub use set::{TemplateHandle, TemplateSet, ROOT_SET_NAME};
pub use source::{DiskFiles, EmbeddedFile, EmbeddedFiles, TemplateSource};

use crate::error::TemplateError;

/// Resolves template names to renderable handles
///
/// Implementations are shared across requests behind an `Arc`, so they must
/// be safe for concurrent use without external locking.
pub trait TemplateManager: Send + Sync {
    /// Resolve `name` to a template
    ///
    /// Fails with [`TemplateError::NotFound`] if the name is not part of the
    /// template set, or with a read/parse error if the set itself could not
    /// be built.
    fn lookup_template(&self, name: &str) -> Result<TemplateHandle, TemplateError>;
}

impl<T: TemplateManager + ?Sized> TemplateManager for std::sync::Arc<T> {
    fn lookup_template(&self, name: &str) -> Result<TemplateHandle, TemplateError> {
        (**self).lookup_template(name)
    }
}

/// Whether a directory entry should be parsed as a template
///
/// Names containing `#` or `~` are editor artifacts (`#home.html#`,
/// `home.html~`) and are never parsed.
#[must_use]
pub fn is_template_file(name: &str) -> bool {
    !name.contains(['#', '~'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_filter_skips_editor_artifacts() {
        assert!(is_template_file("home.html"));
        assert!(is_template_file("404.html"));
        assert!(!is_template_file("home.html~"));
        assert!(!is_template_file("#home.html#"));
        assert!(!is_template_file(".#home.html"));
    }

    proptest! {
        #[test]
        fn prop_filter_rejects_any_name_with_marker(
            prefix in "[a-z0-9._-]{0,12}",
            marker in prop::sample::select(vec!['#', '~']),
            suffix in "[a-z0-9._-]{0,12}",
        ) {
            let name = format!("{prefix}{marker}{suffix}");
            prop_assert!(!is_template_file(&name));
        }

        #[test]
        fn prop_filter_accepts_names_without_marker(name in "[a-zA-Z0-9._-]{1,24}") {
            prop_assert!(is_template_file(&name));
        }
    }
}
