//! Template rendering middleware
//!
//! Wraps a [`PageHandler`] and turns its result into a response.
//!
//! # Example
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use acton_render::prelude::*;
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let templates = Arc::new(FsTemplateManager::new("./templates"));
//! let home = page_fn(|_request| async {
//!     Ok(Page::named("home.html", context! { user => "alice" }))
//! });
//!
//! let app: axum::Router = axum::Router::new()
//!     .route_service("/", TemplateMiddleware::new(templates, home));
//! # Ok(())
//! # }
//! ```

use std::any::Any;
use std::convert::Infallible;
use std::future::Future;
use std::ops::ControlFlow;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::Body;
use futures_util::FutureExt;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Request, Response};

use super::fallback;
use super::{
    CaptureWriter, Page, PageHandler, RequestDeadline, ResponseSink, ResponseWriter,
    DEFAULT_REQUEST_TIMEOUT,
};
use crate::config::RenderConfig;
use crate::error::PageError;
use crate::template::{TemplateDescriptor, TemplateHandle, TemplateManager};

/// Renders the templates chosen by a page handler
///
/// Per request:
/// 1. derives a [`RequestDeadline`] (10 seconds by default) and stores it in
///    the request extensions
/// 2. calls the handler with a capturing writer
/// 3. renders handler errors as error pages, replacing anything the handler
///    wrote before failing
/// 4. stops if the handler wrote a response itself
/// 5. resolves the template (by name through the manager, or directly)
/// 6. renders it with the handler's data
///
/// Every failure goes through the error page chain, so the service never
/// fails and every request gets exactly one response.
pub struct TemplateMiddleware<H> {
    templates: Arc<dyn TemplateManager>,
    handler: Arc<H>,
    timeout: Duration,
}

impl<H> Clone for TemplateMiddleware<H> {
    fn clone(&self) -> Self {
        Self {
            templates: Arc::clone(&self.templates),
            handler: Arc::clone(&self.handler),
            timeout: self.timeout,
        }
    }
}

impl<H: PageHandler> TemplateMiddleware<H> {
    /// Wrap `handler`, resolving templates through `templates`
    pub fn new(templates: Arc<dyn TemplateManager>, handler: H) -> Self {
        Self {
            templates,
            handler: Arc::new(handler),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Wrap `handler` using the request timeout from `config`
    pub fn from_config(
        config: &RenderConfig,
        templates: Arc<dyn TemplateManager>,
        handler: H,
    ) -> Self {
        Self::new(templates, handler).with_timeout(config.middleware.request_timeout())
    }

    /// Set the per-request deadline
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured per-request deadline
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Template manager used for lookups and error pages
    #[must_use]
    pub fn templates(&self) -> &dyn TemplateManager {
        &*self.templates
    }

    /// Render `result`'s error as an error page, see [`fallback::handle_error`]
    pub fn handle_error<T, E>(
        &self,
        writer: &mut dyn ResponseSink,
        result: Result<T, E>,
        context: &[&str],
    ) -> ControlFlow<(), T>
    where
        E: Into<PageError>,
    {
        fallback::handle_error(&*self.templates, writer, result, context)
    }

    async fn dispatch(&self, mut request: Request<Body>) -> Response<Body> {
        let deadline = RequestDeadline::derive(request.extensions().get(), self.timeout);
        request.extensions_mut().insert(deadline);

        let mut writer = ResponseWriter::new();
        let (outcome, captured) = {
            let mut capture = CaptureWriter::new(&mut writer);
            let outcome = self.call_handler(&mut capture, request, deadline).await;
            (outcome, capture.captured())
        };

        if outcome.is_err() && captured.is_some() {
            // Nothing has reached the client yet; the error page replaces it
            tracing::debug!("Discarding handler output before rendering its error");
            writer.clear();
        }

        let ControlFlow::Continue(page) = self.handle_error(&mut writer, outcome, &[]) else {
            return writer.into_response();
        };
        if let Some(status) = captured {
            tracing::trace!(status = status.as_u16(), "Handler wrote its own response");
            return writer.into_response();
        }

        self.render_page(&mut writer, page);
        writer.into_response()
    }

    async fn call_handler(
        &self,
        writer: &mut dyn ResponseSink,
        request: Request<Body>,
        deadline: RequestDeadline,
    ) -> Result<Page, PageError> {
        let budget = deadline.remaining();
        let serve = AssertUnwindSafe(self.handler.serve(writer, request)).catch_unwind();

        tokio::select! {
            result = serve => result.unwrap_or_else(|panic| {
                Err(PageError::Panicked(panic_message(&*panic)))
            }),
            () = deadline.expired() => Err(PageError::DeadlineExceeded(budget)),
        }
    }

    fn render_page(&self, writer: &mut ResponseWriter, page: Page) {
        let (template, data) = page.into_parts();
        let Some(template) = template else {
            fallback::render_error(&*self.templates, writer, &PageError::NoTemplate, &[]);
            return;
        };

        let ControlFlow::Continue(handle) = self.resolve(writer, template) else {
            return;
        };

        let rendered = handle.render(&data);
        let ControlFlow::Continue(html) = self.handle_error(writer, rendered, &[]) else {
            return;
        };
        write_html(writer, &html);
    }

    fn resolve(
        &self,
        writer: &mut ResponseWriter,
        template: TemplateDescriptor,
    ) -> ControlFlow<(), TemplateHandle> {
        match template {
            TemplateDescriptor::Direct(handle) => ControlFlow::Continue(handle),
            TemplateDescriptor::Named(name) => {
                let lookup = self.templates.lookup_template(&name);
                self.handle_error(writer, lookup, &[])
            }
        }
    }
}

fn write_html(writer: &mut ResponseWriter, html: &str) {
    use std::io::Write;

    writer
        .headers_mut()
        .entry(CONTENT_TYPE)
        .or_insert(HeaderValue::from_static("text/html; charset=utf-8"));
    if let Err(err) = writer.write_all(html.as_bytes()) {
        tracing::error!("Failed to write rendered page: {err}");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

impl<H: PageHandler> tower::Service<Request<Body>> for TemplateMiddleware<H> {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let this = self.clone();
        Box::pin(async move { Ok(this.dispatch(request).await) })
    }
}
