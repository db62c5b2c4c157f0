//! Configuration management for acton-render
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `ACTON_` prefix, `__` for nesting)
//! 2. `./config.toml` (or an explicit file)
//! 3. Hardcoded defaults (fallback)
//!
//! Environment variable format: `ACTON_SECTION__FIELD_NAME`
//! - Example: `ACTON_MIDDLEWARE__REQUEST_TIMEOUT_MS=5000`
//! - Example: `ACTON_TEMPLATES__HOT_RELOAD=false`
//!
//! # Example Configuration
//!
//! ```toml
//! # config.toml
//! [templates]
//! template_dir = "./templates"
//! hot_reload = true
//!
//! [middleware]
//! request_timeout_ms = 10000
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::TemplateError;
use crate::middleware::DEFAULT_REQUEST_TIMEOUT;
use crate::template::{DiskFiles, EmbeddedTemplateManager, FsTemplateManager, TemplateManager};

/// Template loading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Directory containing page and error templates
    pub template_dir: PathBuf,

    /// Re-parse templates on every lookup instead of caching them
    pub hot_reload: bool,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("./templates"),
            hot_reload: cfg!(debug_assertions),
        }
    }
}

/// Middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MiddlewareSettings {
    /// Per-request deadline in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for MiddlewareSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: u64::try_from(DEFAULT_REQUEST_TIMEOUT.as_millis())
                .unwrap_or(u64::MAX),
        }
    }
}

impl MiddlewareSettings {
    /// Per-request deadline as a `Duration`
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Complete acton-render configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RenderConfig {
    /// Template settings
    #[serde(default)]
    pub templates: TemplateSettings,

    /// Middleware settings
    #[serde(default)]
    pub middleware: MiddlewareSettings,
}

impl RenderConfig {
    /// Load configuration from `./config.toml` and the environment
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use acton_render::config::RenderConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = RenderConfig::load()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from("./config.toml")
    }

    /// Load configuration from a specific file
    ///
    /// A missing file is not an error; defaults and environment variables
    /// still apply.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config = Figment::new()
            // Start with defaults
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            // Load from specified file (if it exists)
            .merge(Toml::file(path.as_ref()))
            // Environment variables override everything (prefix ACTON_, double underscore for nesting)
            .merge(Env::prefixed("ACTON_").split("__").lowercase(true))
            .extract()?;

        Ok(config)
    }

    /// Build the template manager these settings describe
    ///
    /// With `hot_reload` the directory is re-parsed on every lookup;
    /// otherwise it is parsed once, now, and parse errors are returned.
    pub fn build_manager(&self) -> Result<Arc<dyn TemplateManager>, TemplateError> {
        let dir = &self.templates.template_dir;
        if self.templates.hot_reload {
            tracing::info!(dir = %dir.display(), "Serving templates with hot reload");
            return Ok(Arc::new(FsTemplateManager::new(dir.clone())));
        }

        let manager = EmbeddedTemplateManager::from_source(&DiskFiles, dir)?;
        tracing::info!(
            dir = %dir.display(),
            templates = manager.templates().len(),
            "Serving cached templates"
        );
        Ok(Arc::new(manager))
    }
}
