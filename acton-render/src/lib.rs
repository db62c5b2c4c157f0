//! acton-render: template resolution and rendering middleware
//!
//! Page handlers describe *which* template to render and *what* data to render
//! it with; this crate does the rest:
//! - **Template managers** resolve a template name against a parsed template
//!   set, either cached once at startup or re-parsed per lookup for hot reload
//! - **`TemplateMiddleware`** is a `tower::Service` that runs a page handler
//!   under a request deadline and renders its result
//! - **Error pages** map every failure to `<status>.html`, or to a plain-text
//!   body when no such template exists
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use acton_render::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     acton_render::observability::init()?;
//!
//!     // Re-parses ./templates on every lookup
//!     let templates = Arc::new(FsTemplateManager::new("./templates"));
//!
//!     let home = page_fn(|_request| async {
//!         Ok(Page::named("home.html", context! { user => "alice" }))
//!     });
//!
//!     let app = axum::Router::new()
//!         .route_service("/", TemplateMiddleware::new(templates, home));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

// Lint configuration is handled at the workspace level in Cargo.toml
// Additional crate-specific allows:
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
pub mod template;

#[cfg(test)]
pub(crate) mod testing;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! # Examples
    //!
    //! ```rust
    //! use acton_render::prelude::*;
    //! ```

    // Template resolution
    pub use crate::template::{
        DiskFiles, EmbeddedFile, EmbeddedFiles, EmbeddedTemplateManager, FsTemplateManager,
        TemplateDescriptor, TemplateHandle, TemplateManager, TemplateSet, TemplateSource,
    };

    // Middleware
    pub use crate::middleware::{
        page_fn, CaptureWriter, Page, PageHandler, RequestDeadline, ResponseSink, ResponseWriter,
        TemplateMiddleware,
    };

    // Error types
    pub use crate::error::{HttpError, PageError, TemplateError};

    // Configuration
    pub use crate::config::RenderConfig;

    // Re-export key dependencies
    pub use axum;
    pub use minijinja;
    pub use minijinja::context;
}
