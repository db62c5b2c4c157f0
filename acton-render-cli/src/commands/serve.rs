//! Template preview server command

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use acton_render::config::RenderConfig;
use acton_render::error::{HttpError, PageError, TemplateError};
use acton_render::middleware::{Page, PageHandler, ResponseSink, TemplateMiddleware};
use acton_render::template::TemplateManager;
use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::Query;
use axum::Router;
use console::style;
use http::Request;
use minijinja::context;
use tower_http::trace::TraceLayer;

/// Serve every template in a directory at `/<name>`
pub struct ServeCommand {
    /// Template directory, overriding the configured one
    pub dir: Option<PathBuf>,
    /// Address to listen on
    pub addr: SocketAddr,
    /// Parse once at startup instead of per request
    pub no_reload: bool,
    /// Configuration file
    pub config: PathBuf,
}

impl ServeCommand {
    /// Configuration after command-line overrides
    pub fn resolve_config(&self) -> Result<RenderConfig> {
        let mut config = RenderConfig::load_from(&self.config)
            .with_context(|| format!("Failed to load {}", self.config.display()))?;
        if let Some(dir) = &self.dir {
            config.templates.template_dir.clone_from(dir);
        }
        if self.no_reload {
            config.templates.hot_reload = false;
        }
        Ok(config)
    }

    /// Execute the command
    pub async fn execute(&self) -> Result<()> {
        acton_render::observability::init()?;

        let config = self.resolve_config()?;
        let templates = config
            .build_manager()
            .context("Failed to load templates")?;

        println!(
            "{} {} on {}",
            style("Serving").green().bold(),
            style(config.templates.template_dir.display()).bold(),
            style(format!("http://{}", self.addr)).cyan()
        );
        if config.templates.hot_reload {
            println!("{}", style("Hot reload enabled. Edits show up on the next request.").green());
        }
        println!();

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.addr))?;
        axum::serve(listener, router(&config, templates))
            .await
            .context("Preview server exited with error")?;

        Ok(())
    }
}

/// Router serving every request through a [`PreviewHandler`]
#[must_use]
pub fn router(config: &RenderConfig, templates: Arc<dyn TemplateManager>) -> Router {
    let handler = PreviewHandler::new(Arc::clone(&templates));
    Router::new()
        .fallback_service(TemplateMiddleware::from_config(config, templates, handler))
        .layer(TraceLayer::new_for_http())
}

/// Maps request paths to templates
///
/// `/` renders `index.html`; `/about` and `/about.html` render `about.html`.
/// Templates see the request path as `path` and the query string as `query`.
pub struct PreviewHandler {
    templates: Arc<dyn TemplateManager>,
}

impl PreviewHandler {
    /// Create a handler resolving names through `templates`
    #[must_use]
    pub fn new(templates: Arc<dyn TemplateManager>) -> Self {
        Self { templates }
    }

    /// Template name for a request path, if it can name one
    #[must_use]
    pub fn template_name(path: &str) -> Option<String> {
        let name = path.trim_start_matches('/');
        if name.is_empty() {
            return Some("index.html".to_string());
        }
        if name.contains('/') {
            return None;
        }
        if std::path::Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
        {
            Some(name.to_string())
        } else {
            Some(format!("{name}.html"))
        }
    }
}

#[async_trait::async_trait]
impl PageHandler for PreviewHandler {
    async fn serve(
        &self,
        _writer: &mut dyn ResponseSink,
        request: Request<Body>,
    ) -> Result<Page, PageError> {
        let path = request.uri().path().to_string();
        let name = Self::template_name(&path)
            .ok_or_else(|| HttpError::not_found(format!("No template for {path}")))?;

        let handle = match self.templates.lookup_template(&name) {
            Ok(handle) => handle,
            Err(TemplateError::NotFound(_)) => {
                return Err(HttpError::not_found(format!("No template for {path}")).into());
            }
            Err(err) => return Err(err.into()),
        };

        let Query(query) = Query::<HashMap<String, String>>::try_from_uri(request.uri())
            .map_err(|err| HttpError::bad_request(err.body_text()))?;

        tracing::debug!(path = %path, template = %handle.name(), "Previewing template");
        Ok(Page::direct(handle, context! { path => path, query => query }))
    }
}
