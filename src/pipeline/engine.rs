//! Request lifecycle state machine.
//!
//! # Responsibilities
//! - Drive one request through its stages in a fixed order
//! - Route every failure, returned or panicked, into one error channel
//! - Produce exactly one transport response per request
//! - Write the access log line and request metrics
//!
//! # Design Decisions
//! - Each stage is awaited in turn; a stage that has its result ready
//!   costs nothing extra, one that suspends simply resumes later
//! - The first failing stage short-circuits the rest; the success path and
//!   the error channel are mutually exclusive
//! - A missing method handler is answered with 405 directly and never
//!   reaches the classifier

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use axum::body::{self, Body};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::StatusCode;
use axum::response::Response;
use futures_util::FutureExt;

use crate::auth::{Authenticator, Principal};
use crate::codec::{Charset, Codec, TextCodec, Value};
use crate::http::{ApiRequest, ApiResponse, ErrorKind, HandlerError, HttpError, Payload, RequestHead};
use crate::negotiation::{NegotiationResult, Negotiator};
use crate::observability::metrics;
use crate::pipeline::classify::{self, Stage, StageError};
use crate::resource::{Call, Resource};
use crate::routing::RouteMatch;

/// Client-facing content of every body decode failure.
const UNPARSABLE_BODY: &str = "unable to parse data";

const TEXT_PLAIN: &str = "text/plain";

/// Shared request-processing engine.
pub struct Engine {
    negotiator: Negotiator,
    charset: Charset,
    max_body_size: usize,
    authenticator: Option<Arc<dyn Authenticator>>,
}

/// Response ready for the transport.
#[derive(Debug)]
struct Outgoing {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

/// How the success path ended.
enum Flow {
    Reply(ApiResponse),
    MethodNotAllowed(Vec<String>),
}

impl Engine {
    pub fn new(negotiator: Negotiator, charset: Charset) -> Self {
        Self {
            negotiator,
            charset,
            max_body_size: 2 * 1024 * 1024,
            authenticator: None,
        }
    }

    pub fn max_body_size(mut self, limit: usize) -> Self {
        self.max_body_size = limit;
        self
    }

    /// Strategy for resources that disallow anonymous access without
    /// naming their own.
    pub fn default_authenticator(mut self, authenticator: impl Authenticator + 'static) -> Self {
        self.authenticator = Some(Arc::new(authenticator));
        self
    }

    pub fn negotiator(&self) -> &Negotiator {
        &self.negotiator
    }

    /// Process one routed request.
    pub async fn handle(&self, route: RouteMatch, request: ApiRequest) -> Response {
        let started = Instant::now();
        let method = request.head.method.clone();
        let path = request.head.path.clone();
        let request_id = request.head.request_id().unwrap_or("-").to_string();
        let resource = route.resource.clone();

        let mut negotiated = None;
        let flow = self.run(route, request, &mut negotiated).await;
        let outgoing = match flow {
            Ok(Flow::Reply(response)) => match self.encode_output(response, negotiated.as_ref()) {
                Ok(outgoing) => outgoing,
                Err(error) => self.fail(&resource, &error),
            },
            Ok(Flow::MethodNotAllowed(allowed)) => method_not_allowed(&allowed),
            Err(error) => self.fail(&resource, &error),
        };

        let status = outgoing.status.as_u16();
        let format = negotiated.as_ref().map(|n| n.encode.name()).unwrap_or("-");
        let response = write_response(outgoing);

        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status,
            format = format,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "\"{} {}\" {}",
            method,
            path,
            status
        );
        metrics::record_request(method.as_str(), status, format, started);

        response
    }

    /// The success path: every stage up to and including PrepareOutput.
    async fn run(
        &self,
        route: RouteMatch,
        request: ApiRequest,
        negotiated: &mut Option<NegotiationResult>,
    ) -> Result<Flow, StageError> {
        let RouteMatch { resource, captures } = route;
        let ApiRequest { mut head, body: raw_body } = request;

        // Negotiate
        let signals = self.negotiator.signals(&head.path, &head.query, &head.headers);
        let negotiation = self
            .negotiator
            .negotiate(&signals)
            .map_err(|e| StageError::new(Stage::Negotiate, HttpError::with_content(ErrorKind::NotAcceptable, e.to_string())))?;
        metrics::record_negotiation(negotiation.encode.name(), &negotiation.source.to_string());
        let decoder = negotiation.decode.clone();
        let request_charset = negotiation.request_charset.clone();
        *negotiated = Some(negotiation);

        // Authenticate
        let principal = guard(Stage::Authenticate, self.authenticate(&resource, &head)).await?;
        head.principal = principal;

        // DecodeInput
        let input = if head.has_body() {
            guard(
                Stage::DecodeInput,
                self.decode_input(raw_body, decoder.as_ref(), request_charset.as_deref()),
            )
            .await?
        } else {
            None
        };

        // Dispatch
        let Some(handler) = resource.handler(&head.method_name()) else {
            return Ok(Flow::MethodNotAllowed(resource.allowed_methods()));
        };
        let head = Arc::new(head);
        let call = Call {
            head: head.clone(),
            input,
            args: captures,
        };
        let response = guard(Stage::Dispatch, handler.call(call)).await?;

        // PrepareOutput
        let hooks = resource.output_hooks();
        let response = guard_sync(Stage::PrepareOutput, || {
            hooks.validate(&head, &response)?;
            hooks.serialize(&head, response)
        })?;

        Ok(Flow::Reply(response))
    }

    async fn authenticate(&self, resource: &Resource, head: &RequestHead) -> Result<Option<Principal>, HandlerError> {
        match self.strategy_for(resource) {
            Some(strategy) => strategy.authenticate(head).await.map(Some),
            None if resource.is_anonymous_allowed() => Ok(None),
            None => Err(HttpError::forbidden().into()),
        }
    }

    /// Read the whole body and decode it; an empty body is no input.
    async fn decode_input(
        &self,
        raw_body: Body,
        decoder: &dyn Codec,
        charset_label: Option<&str>,
    ) -> Result<Option<Value>, HandlerError> {
        let bytes = body::to_bytes(raw_body, self.max_body_size).await.map_err(|e| {
            tracing::debug!(error = %e, "Failed to read request body");
            HttpError::bad_request("unable to read request body")
        })?;
        if bytes.is_empty() {
            return Ok(None);
        }

        let charset = match charset_label {
            Some(label) => Charset::from_label(label)
                .ok_or_else(|| HttpError::bad_request(format!("unsupported charset '{}'", label)))?,
            None => self.charset,
        };

        match decoder.decode(&bytes, charset) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::debug!(codec = decoder.name(), error = %e, "Failed to decode request body");
                Err(HttpError::bad_request(UNPARSABLE_BODY).into())
            }
        }
    }

    fn strategy_for(&self, resource: &Resource) -> Option<Arc<dyn Authenticator>> {
        resource.authenticator().cloned().or_else(|| {
            if resource.is_anonymous_allowed() {
                None
            } else {
                self.authenticator.clone()
            }
        })
    }

    /// EncodeOutput on the success path.
    fn encode_output(
        &self,
        response: ApiResponse,
        negotiated: Option<&NegotiationResult>,
    ) -> Result<Outgoing, StageError> {
        let code = if response.status == 0 { 200 } else { response.status };
        let status = StatusCode::from_u16(code)
            .map_err(|_| StageError::new(Stage::EncodeOutput, HandlerError::other(format!("invalid status code {}", code))))?;
        let mut headers = response.headers;

        let body = match response.payload {
            payload if payload.is_empty() => Vec::new(),
            Payload::Value(value) if matches!(code, 200 | 201) => {
                let negotiated = negotiated.ok_or_else(|| {
                    StageError::new(Stage::EncodeOutput, HandlerError::other("response encoded before negotiation"))
                })?;
                let bytes = negotiated
                    .encode
                    .encode(&value, self.charset)
                    .map_err(|e| StageError::new(Stage::EncodeOutput, HandlerError::other(e)))?;
                let content_type = HeaderValue::from_str(&negotiated.content_type)
                    .map_err(|e| StageError::new(Stage::EncodeOutput, HandlerError::other(e)))?;
                headers.insert(header::CONTENT_TYPE, content_type);
                bytes
            }
            Payload::Value(value) => plain_body(&mut headers, &value),
            Payload::Bytes(bytes) => bytes,
            Payload::Empty => Vec::new(),
        };

        Ok(Outgoing { status, headers, body })
    }

    /// ClassifyError followed by EncodeOutput(error-body).
    fn fail(&self, resource: &Resource, error: &StageError) -> Outgoing {
        let strategy = self.strategy_for(resource);
        let response = classify::classify(error, strategy.as_deref());
        encode_error(response)
    }
}

/// Await a stage, turning errors and panics into a `StageError`.
async fn guard<T, F>(stage: Stage, future: F) -> Result<T, StageError>
where
    F: Future<Output = Result<T, HandlerError>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(StageError::new(stage, error)),
        Err(payload) => Err(StageError::panic(stage, payload)),
    }
}

fn guard_sync<T>(stage: Stage, f: impl FnOnce() -> Result<T, HandlerError>) -> Result<T, StageError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(StageError::new(stage, error)),
        Err(payload) => Err(StageError::panic(stage, payload)),
    }
}

/// Error-channel encoding: plain content with the classified status.
fn encode_error(response: ApiResponse) -> Outgoing {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut headers = response.headers;
    let body = match response.payload {
        payload if payload.is_empty() => Vec::new(),
        Payload::Value(value) => plain_body(&mut headers, &value),
        Payload::Bytes(bytes) => {
            headers
                .entry(header::CONTENT_TYPE)
                .or_insert(HeaderValue::from_static(TEXT_PLAIN));
            bytes
        }
        Payload::Empty => Vec::new(),
    };
    Outgoing { status, headers, body }
}

fn plain_body(headers: &mut HeaderMap, value: &Value) -> Vec<u8> {
    headers
        .entry(header::CONTENT_TYPE)
        .or_insert(HeaderValue::from_static(TEXT_PLAIN));
    TextCodec::render(value).into_bytes()
}

fn method_not_allowed(allowed: &[String]) -> Outgoing {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&allowed.join(", ")) {
        headers.insert(header::ALLOW, value);
    }
    Outgoing {
        status: StatusCode::METHOD_NOT_ALLOWED,
        headers,
        body: Vec::new(),
    }
}

/// WriteResponse: the single point where a request's outcome leaves the engine.
fn write_response(outgoing: Outgoing) -> Response {
    let mut response = Response::new(Body::from(outgoing.body));
    *response.status_mut() = outgoing.status;
    *response.headers_mut() = outgoing.headers;
    response
}
