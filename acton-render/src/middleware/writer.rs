//! Write-oriented response building
//!
//! Page handlers get a [`ResponseSink`] so they can take over a response
//! (redirects, JSON, raw bodies) instead of naming a template. The middleware
//! hands them a [`CaptureWriter`] so it can tell afterwards whether they did.

use std::io;

use axum::body::Body;
use bytes::BytesMut;
use http::{HeaderMap, Response, StatusCode};

/// Destination for a response status, headers and body
///
/// The first status written wins; later calls to
/// [`write_header`](ResponseSink::write_header) are ignored. Writing body
/// bytes before any status implies `200 OK`.
pub trait ResponseSink: io::Write + Send {
    /// Response headers
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Set the response status
    fn write_header(&mut self, status: StatusCode);

    /// Status written so far, if any
    fn status(&self) -> Option<StatusCode>;
}

/// In-memory [`ResponseSink`] that becomes an HTTP response
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl ResponseWriter {
    /// Create an empty writer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Body bytes written so far
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Drop everything written so far: status, headers and body
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Finish the response, defaulting the status to `200 OK`
    #[must_use]
    pub fn into_response(self) -> Response<Body> {
        let mut response = Response::new(Body::from(self.body.freeze()));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseSink for ResponseWriter {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        match self.status {
            Some(current) => {
                tracing::debug!(
                    current = current.as_u16(),
                    ignored = status.as_u16(),
                    "Superfluous write_header call"
                );
            }
            None => self.status = Some(status),
        }
    }

    fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

impl io::Write for ResponseWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Decorator that records whether a response was started through it
///
/// Writes pass through unchanged. A status counts as written when
/// [`write_header`](ResponseSink::write_header) is called or when body bytes
/// are written (which implies `200 OK`).
pub struct CaptureWriter<'a> {
    inner: &'a mut dyn ResponseSink,
    captured: Option<StatusCode>,
}

impl<'a> CaptureWriter<'a> {
    /// Wrap `inner`
    pub fn new(inner: &'a mut dyn ResponseSink) -> Self {
        Self {
            inner,
            captured: None,
        }
    }

    /// Status started through this writer, if any
    #[must_use]
    pub const fn captured(&self) -> Option<StatusCode> {
        self.captured
    }

    fn capture(&mut self, status: StatusCode) {
        if self.captured.is_none() {
            self.captured = Some(status);
        }
    }
}

impl ResponseSink for CaptureWriter<'_> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        self.capture(status);
        self.inner.write_header(status);
    }

    fn status(&self) -> Option<StatusCode> {
        self.inner.status()
    }
}

impl io::Write for CaptureWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.capture(self.inner.status().unwrap_or(StatusCode::OK));
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
