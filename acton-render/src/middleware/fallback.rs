//! Error page rendering
//!
//! Every failure ends up here. The response status is fixed first, then the
//! body is chosen:
//! 1. `<status>.html` from the template manager, rendered with the error
//! 2. a plain-text body with the context lines and the error message

use std::io::Write;
use std::ops::ControlFlow;

use http::header::CONTENT_TYPE;
use http::HeaderValue;
use minijinja::context;

use super::ResponseSink;
use crate::error::PageError;
use crate::template::TemplateManager;

/// Template name used for the error page of `status`, e.g. `404.html`
#[must_use]
pub fn error_template_name(status: http::StatusCode) -> String {
    format!("{}.html", status.as_u16())
}

/// Render `result`'s error, if any, and tell the caller whether to stop
///
/// `Ok(value)` passes through as [`ControlFlow::Continue`]. `Err(err)` writes
/// the error response to `writer` and returns [`ControlFlow::Break`]; callers
/// must not write anything else afterwards.
///
/// `context` lines are only shown by the plain-text fallback, one per line
/// before the error message.
pub fn handle_error<T, E>(
    templates: &dyn TemplateManager,
    writer: &mut dyn ResponseSink,
    result: Result<T, E>,
    context: &[&str],
) -> ControlFlow<(), T>
where
    E: Into<PageError>,
{
    match result {
        Ok(value) => ControlFlow::Continue(value),
        Err(err) => {
            render_error(templates, writer, &err.into(), context);
            ControlFlow::Break(())
        }
    }
}

/// Write the error response for `err`, see [`handle_error`]
pub(super) fn render_error(
    templates: &dyn TemplateManager,
    writer: &mut dyn ResponseSink,
    err: &PageError,
    context: &[&str],
) {
    let status = err.status();
    let message = err.public_message();

    // Fixed before the body is chosen; the error page cannot change it
    writer.write_header(status);

    if status.as_u16() < 400 {
        tracing::info!(status = status.as_u16(), "{err}");
    } else {
        tracing::warn!(status = status.as_u16(), "{err}");
    }

    let name = error_template_name(status);
    let page = match templates.lookup_template(&name) {
        Ok(page) => page,
        Err(lookup_err) => {
            tracing::warn!("Did not find template {name} {lookup_err}");
            write_basic_error_response(writer, &message, context);
            return;
        }
    };

    let data = context! {
        status => status.as_u16(),
        reason => status.canonical_reason(),
        message => &message,
        context => context,
    };
    match page.render(data) {
        Ok(html) => {
            writer
                .headers_mut()
                .entry(CONTENT_TYPE)
                .or_insert(HeaderValue::from_static("text/html; charset=utf-8"));
            if let Err(write_err) = writer.write_all(html.as_bytes()) {
                tracing::error!("Failed to write error page {name}: {write_err}");
            }
        }
        Err(render_err) => {
            tracing::warn!("{render_err}");
            write_basic_error_response(writer, &message, context);
        }
    }
}

/// Last line of defense: context lines and message as plain text
///
/// Never fails; write errors are logged and dropped.
fn write_basic_error_response(writer: &mut dyn ResponseSink, message: &str, context: &[&str]) {
    let mut body = String::new();
    for line in context {
        body.push_str(line);
        body.push('\n');
    }
    body.push_str(message);
    body.push('\n');

    writer
        .headers_mut()
        .entry(CONTENT_TYPE)
        .or_insert(HeaderValue::from_static("text/plain; charset=utf-8"));
    if let Err(err) = writer.write_all(body.as_bytes()) {
        tracing::error!("Failed to write basic error response: {err}");
    }
}
