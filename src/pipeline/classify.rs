//! Error classification.
//!
//! Turns whatever ended a request early into the response the client sees.
//! Classified errors keep their status and content; unauthorized outcomes
//! are handed to the authentication strategy for a challenge; anything
//! else becomes a bare 500 and is logged in full server-side.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::auth::Authenticator;
use crate::http::{ApiResponse, ErrorKind, HandlerError, HttpError};

/// Body of every unclassified failure.
pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error";

/// Steps of the request lifecycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Negotiate,
    Authenticate,
    DecodeInput,
    Dispatch,
    PrepareOutput,
    EncodeOutput,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Negotiate => "negotiate",
            Stage::Authenticate => "authenticate",
            Stage::DecodeInput => "decode_input",
            Stage::Dispatch => "dispatch",
            Stage::PrepareOutput => "prepare_output",
            Stage::EncodeOutput => "encode_output",
        };
        f.write_str(name)
    }
}

/// What went wrong inside a stage.
#[derive(Debug)]
pub enum Failure {
    Error(HandlerError),
    /// A panic, with its message when it carried one.
    Panic(String),
}

/// A failure tagged with the stage it escaped from.
#[derive(Debug)]
pub struct StageError {
    pub stage: Stage,
    pub failure: Failure,
}

impl StageError {
    pub fn new(stage: Stage, error: impl Into<HandlerError>) -> Self {
        Self {
            stage,
            failure: Failure::Error(error.into()),
        }
    }

    pub fn panic(stage: Stage, payload: Box<dyn Any + Send>) -> Self {
        Self {
            stage,
            failure: Failure::Panic(panic_message(payload.as_ref())),
        }
    }

    /// The classified error, if this is one.
    pub fn http_error(&self) -> Option<&HttpError> {
        match &self.failure {
            Failure::Error(HandlerError::Http(error)) => Some(error),
            _ => None,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Map a stage failure to a response.
///
/// `strategy` builds the challenge for `Unauthorized`; without one a plain
/// 401 is returned.
pub fn classify(error: &StageError, strategy: Option<&dyn Authenticator>) -> ApiResponse {
    match &error.failure {
        Failure::Error(HandlerError::Http(http)) if http.kind == ErrorKind::Unauthorized => {
            tracing::debug!(stage = %error.stage, "Authentication required");
            match strategy {
                Some(strategy) => challenge(strategy, http),
                None => plain(http),
            }
        }
        Failure::Error(HandlerError::Http(http)) => {
            tracing::debug!(stage = %error.stage, status = http.status().as_u16(), error = %http, "Request failed");
            plain(http)
        }
        Failure::Error(HandlerError::Unclassified(source)) => {
            tracing::error!(stage = %error.stage, error = %source, detail = ?source, "Unhandled error");
            internal_error()
        }
        Failure::Panic(message) => {
            tracing::error!(stage = %error.stage, panic = %message, "Panic while processing request");
            internal_error()
        }
    }
}

fn challenge(strategy: &dyn Authenticator, error: &HttpError) -> ApiResponse {
    match panic::catch_unwind(AssertUnwindSafe(|| strategy.auth_failed(error))) {
        Ok(response) => response,
        Err(payload) => {
            tracing::error!(panic = %panic_message(payload.as_ref()), "Challenge builder panicked");
            plain(error)
        }
    }
}

fn plain(error: &HttpError) -> ApiResponse {
    ApiResponse::text(error.status().as_u16(), error.content.clone().unwrap_or_default())
}

/// Minimal 500 response; never carries failure details.
pub fn internal_error() -> ApiResponse {
    ApiResponse::text(500, INTERNAL_ERROR_BODY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{HttpBasic, SyncCheck};
    use crate::http::Payload;
    use axum::http::header;

    fn body(response: &ApiResponse) -> String {
        match &response.payload {
            Payload::Bytes(bytes) => String::from_utf8(bytes.clone()).unwrap(),
            Payload::Empty => String::new(),
            Payload::Value(value) => value.to_string(),
        }
    }

    #[test]
    fn test_classified_error_keeps_status_and_content() {
        let error = StageError::new(Stage::Dispatch, HttpError::with_content(ErrorKind::NotFound, "Can't find it, sorry."));
        let response = classify(&error, None);
        assert_eq!(response.status, 404);
        assert_eq!(body(&response), "Can't find it, sorry.");
    }

    #[test]
    fn test_unclassified_error_is_opaque() {
        let error = StageError::new(Stage::Dispatch, HandlerError::other("connection string: secret"));
        let response = classify(&error, None);
        assert_eq!(response.status, 500);
        assert_eq!(body(&response), INTERNAL_ERROR_BODY);
    }

    #[test]
    fn test_panic_is_opaque() {
        let payload = panic::catch_unwind(|| panic!("boom")).unwrap_err();
        let error = StageError::panic(Stage::PrepareOutput, payload);
        assert!(matches!(&error.failure, Failure::Panic(message) if message == "boom"));
        let response = classify(&error, None);
        assert_eq!(response.status, 500);
        assert_eq!(body(&response), INTERNAL_ERROR_BODY);
    }

    #[test]
    fn test_unauthorized_uses_strategy_challenge() {
        let strategy = HttpBasic::new("vault", SyncCheck(|_: &str, _: &str| false));
        let error = StageError::new(Stage::Authenticate, HttpError::unauthorized());

        let response = classify(&error, Some(&strategy));
        assert_eq!(response.status, 401);
        assert_eq!(response.headers[header::WWW_AUTHENTICATE], "Basic realm=\"vault\"");

        let bare = classify(&error, None);
        assert_eq!(bare.status, 401);
        assert!(bare.headers.get(header::WWW_AUTHENTICATE).is_none());
    }
}
