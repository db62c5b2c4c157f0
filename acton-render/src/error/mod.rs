//! Error types and error handling
//!
//! Three layers of failure flow through the renderer:
//! - [`TemplateError`]: reading, parsing, finding or executing templates
//! - [`HttpError`]: an application error that carries the status it wants
//! - [`PageError`]: anything a page handler (or the dispatch around it) fails with
//!
//! Only [`HttpError`] influences the response status. Every other failure is
//! reported as `500 Internal Server Error` with a generic message.

use std::path::PathBuf;
use std::time::Duration;

use http::StatusCode;
use thiserror::Error;

/// Errors raised while resolving or executing templates
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template directory could not be listed
    #[error("failed to read template directory '{}': {source}", .dir.display())]
    DirectoryRead {
        /// Directory that was being listed
        dir: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A template file could not be read
    #[error("failed to read template file '{}': {source}", .path.display())]
    FileRead {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A template file failed to compile into the template set
    #[error("failed to parse template '{name}': {source}")]
    Parse {
        /// Template name (its file name)
        name: String,
        /// Engine diagnostic
        #[source]
        source: minijinja::Error,
    },

    /// The requested name is not part of the parsed template set
    #[error("cannot find template {0}")]
    NotFound(String),

    /// Executing a resolved template against its data failed
    #[error("failed to render template '{name}': {source}")]
    Render {
        /// Template name
        name: String,
        /// Engine diagnostic
        #[source]
        source: minijinja::Error,
    },
}

impl TemplateError {
    /// True if the template name was absent from an otherwise valid set
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Application error carrying an explicit HTTP status
///
/// Return this (directly, or anywhere in an `anyhow` cause chain) from a page
/// handler to choose the status code and the message shown on the error page.
///
/// # Examples
///
/// ```rust
/// use acton_render::error::HttpError;
/// use http::StatusCode;
///
/// let err = HttpError::not_found("no such post");
/// assert_eq!(err.status(), StatusCode::NOT_FOUND);
/// assert_eq!(err.to_string(), "no such post");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    /// Create an error with an explicit status
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Bad request (400)
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Unauthorized (401)
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Forbidden (403)
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Not Found (404)
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Status this error should be reported with
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Human-readable message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure of a page request
#[derive(Debug, Error)]
pub enum PageError {
    /// Status-carrying application error
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Template lookup or execution failed
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The handler did not finish before the request deadline
    #[error("request deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    /// The handler panicked
    #[error("page handler panicked: {0}")]
    Panicked(String),

    /// The handler neither named a template nor wrote a response
    #[error("page handler returned no template and wrote no response")]
    NoTemplate,

    /// Any other handler failure
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PageError {
    /// The status-carrying error behind this failure, if any
    ///
    /// Searches the whole cause chain of [`PageError::Other`], so
    /// `Err(HttpError::forbidden("..")).context("loading post")` still
    /// reports 403.
    #[must_use]
    pub fn http_error(&self) -> Option<&HttpError> {
        match self {
            Self::Http(err) => Some(err),
            Self::Other(err) => err.chain().find_map(|cause| cause.downcast_ref::<HttpError>()),
            _ => None,
        }
    }

    /// Status to respond with: the declared one, else 500
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.http_error()
            .map_or(StatusCode::INTERNAL_SERVER_ERROR, HttpError::status)
    }

    /// Message safe to show the client
    ///
    /// Uncategorized failures only expose the status reason phrase; their
    /// details go to the log.
    #[must_use]
    pub fn public_message(&self) -> String {
        self.http_error().map_or_else(
            || {
                StatusCode::INTERNAL_SERVER_ERROR
                    .canonical_reason()
                    .unwrap_or("Internal Server Error")
                    .to_string()
            },
            |err| err.message().to_string(),
        )
    }
}
