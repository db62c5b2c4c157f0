//! Template check command

use std::path::{Path, PathBuf};

use acton_render::template::{DiskFiles, TemplateSet};
use anyhow::{Context, Result};
use console::style;

/// Parse a template directory the way the server would
pub struct CheckCommand {
    dir: PathBuf,
}

impl CheckCommand {
    /// Create a new command instance
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory being checked
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Parse the directory and return the resulting set
    pub fn run(&self) -> Result<TemplateSet> {
        TemplateSet::parse_dir(&DiskFiles, &self.dir)
            .with_context(|| format!("Template check failed for {}", self.dir.display()))
    }

    /// Execute the command
    pub fn execute(&self) -> Result<()> {
        println!(
            "{} {}",
            style("Checking").green().bold(),
            style(self.dir.display()).bold()
        );
        println!();

        let templates = self.run()?;
        for name in templates.names() {
            if is_error_page(name) {
                println!("  {} {} {}", style("✓").green(), name, style("(error page)").dim());
            } else {
                println!("  {} {}", style("✓").green(), name);
            }
        }

        println!();
        println!(
            "{} {} template(s) parsed",
            style("OK").green().bold(),
            templates.len()
        );
        Ok(())
    }
}

/// Whether `name` is looked up for error responses, e.g. `404.html`
#[must_use]
pub fn is_error_page(name: &str) -> bool {
    name.strip_suffix(".html")
        .and_then(|code| code.parse::<u16>().ok())
        .is_some_and(|code| http::StatusCode::from_u16(code).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_check_lists_templates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("home.html"), "home").unwrap();
        fs::write(dir.path().join("404.html"), "missing").unwrap();
        fs::write(dir.path().join("home.html~"), "{% if %}").unwrap();

        let templates = CheckCommand::new(dir.path()).run().unwrap();
        assert_eq!(templates.names(), ["404.html", "home.html"]);
    }

    #[test]
    fn test_check_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.html"), "{% if %}").unwrap();

        let err = CheckCommand::new(dir.path()).run().unwrap_err();
        assert!(err.to_string().starts_with("Template check failed"));
    }

    #[test]
    fn test_is_error_page() {
        assert!(is_error_page("404.html"));
        assert!(is_error_page("500.html"));
        assert!(!is_error_page("home.html"));
        assert!(!is_error_page("404.txt"));
        assert!(!is_error_page("42.html"));
    }
}
