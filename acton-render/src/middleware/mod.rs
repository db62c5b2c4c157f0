//! Middleware for templated pages
//!
//! Provides:
//! - [`TemplateMiddleware`]: `tower::Service` that runs a [`PageHandler`] and
//!   renders the template it picks
//! - Response writers ([`ResponseSink`], [`ResponseWriter`], [`CaptureWriter`])
//!   for handlers that write their own response
//! - [`RequestDeadline`]: per-request deadline stored in request extensions
//! - Error page rendering ([`fallback::handle_error`])

mod deadline;
pub mod fallback;
mod handler;
mod service;
mod writer;

pub use deadline::{RequestDeadline, DEFAULT_REQUEST_TIMEOUT};
pub use fallback::{error_template_name, handle_error};
pub use handler::{page_fn, Page, PageFn, PageHandler};
pub use service::TemplateMiddleware;
pub use writer::{CaptureWriter, ResponseSink, ResponseWriter};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HttpError, PageError};
    use crate::template::{EmbeddedFile, EmbeddedFiles, EmbeddedTemplateManager, TemplateHandle};
    use crate::testing::{body_string, get};
    use async_trait::async_trait;
    use axum::body::Body;
    use http::header::{CONTENT_TYPE, LOCATION};
    use http::{HeaderValue, Request, StatusCode};
    use minijinja::context;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    static FILES: EmbeddedFiles = EmbeddedFiles::new(&[
        EmbeddedFile::new("templates/home.html", "<h1>Hello {{ user }}</h1>"),
        EmbeddedFile::new("templates/404.html", "<p>{{ status }}: {{ message }}</p>"),
        EmbeddedFile::new("templates/broken-data.html", "{{ user.name.first }}"),
    ]);

    fn templates() -> Arc<EmbeddedTemplateManager> {
        Arc::new(EmbeddedTemplateManager::new(&FILES, "templates").unwrap())
    }

    struct Redirect;

    #[async_trait]
    impl PageHandler for Redirect {
        async fn serve(
            &self,
            writer: &mut dyn ResponseSink,
            _request: Request<Body>,
        ) -> Result<Page, PageError> {
            writer
                .headers_mut()
                .insert(LOCATION, HeaderValue::from_static("/login"));
            writer.write_header(StatusCode::FOUND);
            Ok(Page::handled())
        }
    }

    struct RawJson;

    #[async_trait]
    impl PageHandler for RawJson {
        async fn serve(
            &self,
            writer: &mut dyn ResponseSink,
            _request: Request<Body>,
        ) -> Result<Page, PageError> {
            writer
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            writer.write_all(br#"{"ok":true}"#).map_err(anyhow::Error::from)?;
            // Descriptor is ignored once the handler has written
            Ok(Page::named("home.html", context! { user => "ignored" }))
        }
    }

    struct PartialThenFail;

    #[async_trait]
    impl PageHandler for PartialThenFail {
        async fn serve(
            &self,
            writer: &mut dyn ResponseSink,
            _request: Request<Body>,
        ) -> Result<Page, PageError> {
            writer
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            writer.write_all(b"<partial>").map_err(anyhow::Error::from)?;
            Err(HttpError::not_found("no such post").into())
        }
    }

    struct RedirectThenStall;

    #[async_trait]
    impl PageHandler for RedirectThenStall {
        async fn serve(
            &self,
            writer: &mut dyn ResponseSink,
            _request: Request<Body>,
        ) -> Result<Page, PageError> {
            writer
                .headers_mut()
                .insert(LOCATION, HeaderValue::from_static("/login"));
            writer.write_header(StatusCode::FOUND);
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Page::handled())
        }
    }

    #[tokio::test]
    async fn test_named_template_renders_with_200() {
        let handler = page_fn(|_request| async {
            Ok(Page::named("home.html", context! { user => "alice" }))
        });
        let service = TemplateMiddleware::new(templates(), handler);

        let response = service.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert_eq!(body_string(response).await, "<h1>Hello alice</h1>");
    }

    #[tokio::test]
    async fn test_direct_template_skips_lookup() {
        let handler = page_fn(|_request| async {
            let handle = TemplateHandle::from_source("inline.html", "inline {{ n }}")?;
            Ok::<_, PageError>(Page::direct(handle, context! { n => 3 }))
        });
        let service = TemplateMiddleware::new(templates(), handler);

        let response = service.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "inline 3");
    }

    #[tokio::test]
    async fn test_handler_written_redirect_is_left_alone() {
        let service = TemplateMiddleware::new(templates(), Redirect);

        let response = service.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/login");
        assert!(body_string(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_handler_written_body_is_not_rendered_over() {
        let service = TemplateMiddleware::new(templates(), RawJson);

        let response = service.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_string(response).await, r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn test_handler_error_uses_status_template() {
        let handler = page_fn(|_request| async {
            Err::<Page, _>(HttpError::not_found("no such post").into())
        });
        let service = TemplateMiddleware::new(templates(), handler);

        let response = service.oneshot(get("/posts/9")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "<p>404: no such post</p>");
    }

    #[tokio::test]
    async fn test_error_after_partial_write_replaces_handler_output() {
        let service = TemplateMiddleware::new(templates(), PartialThenFail);

        let response = service.oneshot(get("/posts/9")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert_eq!(body_string(response).await, "<p>404: no such post</p>");
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_after_redirect_replaces_handler_output() {
        let service = TemplateMiddleware::new(templates(), RedirectThenStall);

        let response = service.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(LOCATION).is_none());
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_string(response).await, "Internal Server Error\n");
    }

    #[tokio::test]
    async fn test_handler_error_without_template_is_plain_text() {
        let handler = page_fn(|_request| async {
            Err::<Page, _>(HttpError::forbidden("members only").into())
        });
        let service = TemplateMiddleware::new(templates(), handler);

        let response = service.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_string(response).await, "members only\n");
    }

    #[tokio::test]
    async fn test_unknown_template_is_500() {
        let handler = page_fn(|_request| async { Ok(Page::named("missing.html", ())) });
        let service = TemplateMiddleware::new(templates(), handler);

        let response = service.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "Internal Server Error\n");
    }

    #[tokio::test]
    async fn test_render_failure_is_500_without_partial_output() {
        let handler = page_fn(|_request| async {
            Ok(Page::named("broken-data.html", context! { user => "flat" }))
        });
        let service = TemplateMiddleware::new(templates(), handler);

        let response = service.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "Internal Server Error\n");
    }

    #[tokio::test]
    async fn test_handled_page_without_write_is_500() {
        let handler = page_fn(|_request| async { Ok(Page::handled()) });
        let service = TemplateMiddleware::new(templates(), handler);

        let response = service.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_handler_sees_request_deadline() {
        let handler = page_fn(|request: Request<Body>| async move {
            let deadline = request
                .extensions()
                .get::<RequestDeadline>()
                .copied()
                .ok_or_else(|| anyhow::anyhow!("no deadline"))?;
            let secs = deadline.remaining().as_secs();
            Ok::<_, PageError>(Page::named("home.html", context! { user => secs }))
        });
        let service = TemplateMiddleware::new(templates(), handler);

        let response = service.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body == "<h1>Hello 9</h1>" || body == "<h1>Hello 10</h1>", "{body}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_handler_hits_deadline() {
        let handler = page_fn(|_request| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Page::named("home.html", context! { user => "late" }))
        });
        let service = TemplateMiddleware::new(templates(), handler);

        let started = tokio::time::Instant::now();
        let response = service.oneshot(get("/")).await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(10));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_timeout() {
        let handler = page_fn(|_request| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok(Page::named("home.html", context! { user => "on time" }))
        });
        let service =
            TemplateMiddleware::new(templates(), handler).with_timeout(Duration::from_secs(1));

        let response = service.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_panicking_handler_still_gets_a_response() {
        let handler = page_fn(|request: Request<Body>| async move {
            assert!(request.uri().path() != "/boom", "handler exploded");
            Ok(Page::named("home.html", context! { user => "fine" }))
        });
        let service = TemplateMiddleware::new(templates(), handler);

        let response = service.clone().oneshot(get("/boom")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "Internal Server Error\n");

        let response = service.oneshot(get("/ok")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
