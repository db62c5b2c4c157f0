//! Where template files are read from

use std::borrow::Cow;
use std::io;
use std::path::{Component, Path, PathBuf};

/// A read-only tree of template files
pub trait TemplateSource: Send + Sync {
    /// File names directly inside `dir`
    ///
    /// Only regular files are listed; subdirectories are not descended into.
    fn list(&self, dir: &Path) -> io::Result<Vec<String>>;

    /// Contents of the file at `path`
    fn read(&self, path: &Path) -> io::Result<Cow<'static, str>>;
}

/// One file compiled into the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedFile {
    path: &'static str,
    contents: &'static str,
}

impl EmbeddedFile {
    /// Create an embedded file entry, usually with `include_str!`
    ///
    /// ```rust,ignore
    /// EmbeddedFile::new("templates/home.html", include_str!("../templates/home.html"))
    /// ```
    #[must_use]
    pub const fn new(path: &'static str, contents: &'static str) -> Self {
        Self { path, contents }
    }

    /// Path of the file inside the embedded tree
    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// File contents
    #[must_use]
    pub const fn contents(&self) -> &'static str {
        self.contents
    }
}

/// Template files compiled into the binary
///
/// # Example
///
/// ```rust
/// use acton_render::template::{EmbeddedFile, EmbeddedFiles};
///
/// static TEMPLATES: EmbeddedFiles = EmbeddedFiles::new(&[
///     EmbeddedFile::new("templates/home.html", "<h1>Home</h1>"),
///     EmbeddedFile::new("templates/404.html", "<h1>{{ message }}</h1>"),
/// ]);
///
/// assert_eq!(TEMPLATES.len(), 2);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedFiles {
    files: &'static [EmbeddedFile],
}

impl EmbeddedFiles {
    /// Wrap a static list of files
    #[must_use]
    pub const fn new(files: &'static [EmbeddedFile]) -> Self {
        Self { files }
    }

    /// Number of embedded files
    #[must_use]
    pub const fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files are embedded
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn entries_in(&self, dir: &Path) -> impl Iterator<Item = &EmbeddedFile> + '_ {
        let dir = tree_path(dir);
        self.files.iter().filter(move |file| {
            Path::new(file.path).parent().map(tree_path).as_ref() == Some(&dir)
        })
    }
}

/// `path` without `.` components, so `.` names the root of the tree
fn tree_path(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| *component != Component::CurDir)
        .collect()
}

impl TemplateSource for EmbeddedFiles {
    fn list(&self, dir: &Path) -> io::Result<Vec<String>> {
        let names: Vec<String> = self
            .entries_in(dir)
            .filter_map(|file| Path::new(file.path).file_name()?.to_str())
            .map(str::to_string)
            .collect();

        if names.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no embedded directory '{}'", dir.display()),
            ));
        }
        Ok(names)
    }

    fn read(&self, path: &Path) -> io::Result<Cow<'static, str>> {
        self.files
            .iter()
            .find(|file| tree_path(Path::new(file.path)) == tree_path(path))
            .map(|file| Cow::Borrowed(file.contents))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no embedded file '{}'", path.display()),
                )
            })
    }
}

/// Template files on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFiles;

impl TemplateSource for DiskFiles {
    fn list(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => {
                    tracing::debug!(?name, "Skipping template file with non UTF-8 name");
                }
            }
        }
        Ok(names)
    }

    fn read(&self, path: &Path) -> io::Result<Cow<'static, str>> {
        std::fs::read_to_string(path).map(Cow::Owned)
    }
}
