//! Page handlers and what they return

use std::future::Future;

use async_trait::async_trait;
use axum::body::Body;
use http::Request;
use minijinja::Value;
use serde::Serialize;

use super::ResponseSink;
use crate::error::PageError;
use crate::template::{TemplateDescriptor, TemplateHandle};

/// Successful outcome of a page handler
#[derive(Debug, Clone)]
pub struct Page {
    template: Option<TemplateDescriptor>,
    data: Value,
}

impl Page {
    /// Render the template called `name` with `data`
    ///
    /// ```rust
    /// use acton_render::middleware::Page;
    /// use minijinja::context;
    ///
    /// let page = Page::named("home.html", context! { user => "alice" });
    /// assert_eq!(page.template().unwrap().name(), "home.html");
    /// ```
    pub fn named(name: impl Into<String>, data: impl Serialize) -> Self {
        Self::render(TemplateDescriptor::named(name), data)
    }

    /// Render an already-resolved template with `data`
    pub fn direct(handle: TemplateHandle, data: impl Serialize) -> Self {
        Self::render(TemplateDescriptor::Direct(handle), data)
    }

    /// Render whatever `template` describes with `data`
    pub fn render(template: TemplateDescriptor, data: impl Serialize) -> Self {
        Self {
            template: Some(template),
            data: Value::from_serialize(data),
        }
    }

    /// The handler wrote the response itself; render nothing
    #[must_use]
    pub const fn handled() -> Self {
        Self {
            template: None,
            data: Value::UNDEFINED,
        }
    }

    /// Template to render, if any
    #[must_use]
    pub const fn template(&self) -> Option<&TemplateDescriptor> {
        self.template.as_ref()
    }

    /// Data the template is rendered with
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }

    pub(crate) fn into_parts(self) -> (Option<TemplateDescriptor>, Value) {
        (self.template, self.data)
    }
}

/// Application logic behind a templated page
///
/// Return a [`Page`] naming the template and its data, or write the response
/// through `writer` and return [`Page::handled`]. Errors are rendered as
/// error pages by the middleware.
///
/// ```rust
/// use acton_render::prelude::*;
/// use async_trait::async_trait;
/// use axum::body::Body;
/// use http::{header::LOCATION, HeaderValue, Request, StatusCode};
///
/// struct Logout;
///
/// #[async_trait]
/// impl PageHandler for Logout {
///     async fn serve(
///         &self,
///         writer: &mut dyn ResponseSink,
///         _request: Request<Body>,
///     ) -> Result<Page, PageError> {
///         writer.headers_mut().insert(LOCATION, HeaderValue::from_static("/"));
///         writer.write_header(StatusCode::SEE_OTHER);
///         Ok(Page::handled())
///     }
/// }
/// ```
#[async_trait]
pub trait PageHandler: Send + Sync + 'static {
    /// Handle one request
    async fn serve(
        &self,
        writer: &mut dyn ResponseSink,
        request: Request<Body>,
    ) -> Result<Page, PageError>;
}

/// [`PageHandler`] built from an async closure, see [`page_fn`]
#[derive(Clone, Copy)]
pub struct PageFn<F>(F);

/// Turn an async closure over the request into a [`PageHandler`]
///
/// For handlers that never write the response themselves.
///
/// ```rust
/// use acton_render::prelude::*;
///
/// let handler = page_fn(|request: http::Request<axum::body::Body>| async move {
///     let path = request.uri().path().to_string();
///     Ok(Page::named("home.html", context! { path }))
/// });
/// ```
pub const fn page_fn<F, Fut>(f: F) -> PageFn<F>
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Page, PageError>> + Send + 'static,
{
    PageFn(f)
}

#[async_trait]
impl<F, Fut> PageHandler for PageFn<F>
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Page, PageError>> + Send + 'static,
{
    async fn serve(
        &self,
        _writer: &mut dyn ResponseSink,
        request: Request<Body>,
    ) -> Result<Page, PageError> {
        (self.0)(request).await
    }
}
