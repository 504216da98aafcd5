//! Response model produced by handlers.
//!
//! # Design Decisions
//! - Handlers return values, not bytes; the pipeline encodes them with the
//!   negotiated codec
//! - Status 0 means "unset" and becomes 200 on the success path
//! - Raw bytes bypass encoding for handlers that produce their own format

use axum::http::header::{HeaderName, HeaderValue};
use axum::http::HeaderMap;

use crate::codec::Value;

/// Body of a handler response before encoding.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    Empty,
    /// Encoded with the negotiated codec.
    Value(Value),
    /// Written verbatim.
    Bytes(Vec<u8>),
}

impl Payload {
    /// `Empty` and `Value(Null)` both mean no body.
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Empty => true,
            Payload::Value(Value::Null) => true,
            Payload::Value(_) => false,
            Payload::Bytes(bytes) => bytes.is_empty(),
        }
    }
}

/// A handler response.
#[derive(Debug, Clone, Default)]
pub struct ApiResponse {
    /// 0 until someone sets it.
    pub status: u16,
    pub headers: HeaderMap,
    pub payload: Payload,
}

impl ApiResponse {
    pub fn new(status: u16, payload: Payload) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            payload,
        }
    }

    pub fn ok(value: impl Into<Value>) -> Self {
        Self::new(200, Payload::Value(value.into()))
    }

    pub fn created(value: impl Into<Value>) -> Self {
        Self::new(201, Payload::Value(value.into()))
    }

    /// No body, explicit status.
    pub fn empty(status: u16) -> Self {
        Self::new(status, Payload::Empty)
    }

    /// Plain content written as-is, e.g. an error message.
    pub fn text(status: u16, content: impl Into<String>) -> Self {
        Self::new(status, Payload::Bytes(content.into().into_bytes()))
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

impl From<Value> for ApiResponse {
    fn from(value: Value) -> Self {
        Self::new(0, Payload::Value(value))
    }
}

impl From<()> for ApiResponse {
    fn from(_: ()) -> Self {
        Self::default()
    }
}
