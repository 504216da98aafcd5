//! HTTP error taxonomy.
//!
//! One error type carrying a kind and optional client-facing content, plus
//! the error type handlers return.

use std::fmt;

use axum::http::StatusCode;

/// Closed set of error outcomes a request can end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    Conflict,
    InternalServerError,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorKind::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.status();
        write!(f, "{} {}", status.as_u16(), status.canonical_reason().unwrap_or("Unknown"))
    }
}

/// A classified HTTP failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}{}", suffix(.content))]
pub struct HttpError {
    pub kind: ErrorKind,
    /// Body sent to the client, if any.
    pub content: Option<String>,
}

impl HttpError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, content: None }
    }

    pub fn with_content(kind: ErrorKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: Some(content.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    pub fn bad_request(content: impl Into<String>) -> Self {
        Self::with_content(ErrorKind::BadRequest, content)
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorKind::Unauthorized)
    }

    pub fn forbidden() -> Self {
        Self::new(ErrorKind::Forbidden)
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    pub fn conflict(content: impl Into<String>) -> Self {
        Self::with_content(ErrorKind::Conflict, content)
    }
}

fn suffix(content: &Option<String>) -> String {
    content.as_deref().map(|c| format!(": {}", c)).unwrap_or_default()
}

/// Error returned by handlers, hooks and authenticators.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Mapped to its own status by the classifier.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Anything else; becomes a 500 with a minimal body.
    #[error("{0}")]
    Unclassified(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    pub fn other<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        HandlerError::Unclassified(error.into())
    }
}

impl From<ErrorKind> for HandlerError {
    fn from(kind: ErrorKind) -> Self {
        HandlerError::Http(HttpError::new(kind))
    }
}
