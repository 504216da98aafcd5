//! Request model seen by the pipeline.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Split the transport request into a shareable head and a body
//! - Parse the query string once per request
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The head is immutable once the pipeline hands it to a handler; the
//!   principal slot is filled by the Authenticate stage before that

use std::collections::HashMap;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Method, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::auth::Principal;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Issues a fresh UUID v4 for every request lacking an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Everything about a request except its body.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub query: HashMap<String, String>,
    /// Identity resolved by authentication, if any.
    pub principal: Option<Principal>,
}

impl RequestHead {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query: HashMap::new(),
            principal: None,
        }
    }

    /// Header value as text; non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Lower-cased method name used to pick the handler.
    pub fn method_name(&self) -> String {
        self.method.as_str().to_ascii_lowercase()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(X_REQUEST_ID)
    }

    /// Whether this method carries a body the pipeline should decode.
    pub fn has_body(&self) -> bool {
        matches!(self.method, Method::PUT | Method::POST | Method::PATCH)
    }
}

/// A request entering the pipeline.
#[derive(Debug)]
pub struct ApiRequest {
    pub head: RequestHead,
    pub body: Body,
}

impl ApiRequest {
    pub fn from_http(request: Request<Body>) -> Self {
        let (parts, body) = request.into_parts();
        let query = parts.uri.query().map(parse_query).unwrap_or_default();
        let head = RequestHead {
            method: parts.method,
            path: parts.uri.path().to_string(),
            headers: parts.headers,
            query,
            principal: None,
        };
        Self { head, body }
    }
}

/// Decode a query string; the first occurrence of a key wins.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http() {
        let request = Request::builder()
            .method("PUT")
            .uri("http://example.com/items/a?format=yaml&x=1&format=xml")
            .header("Content-Type", "application/json")
            .body(Body::empty())
            .unwrap();

        let request = ApiRequest::from_http(request);
        assert_eq!(request.head.path, "/items/a");
        assert_eq!(request.head.method_name(), "put");
        assert_eq!(request.head.query_param("format"), Some("yaml"));
        assert_eq!(request.head.query_param("x"), Some("1"));
        assert_eq!(request.head.header("content-type"), Some("application/json"));
        assert!(request.head.has_body());
        assert!(request.head.principal.is_none());
    }

    #[test]
    fn test_query_decoding() {
        let params = parse_query("name=luke+skywalker&q=%2Fpath");
        assert_eq!(params["name"], "luke skywalker");
        assert_eq!(params["q"], "/path");
    }

    #[test]
    fn test_request_ids_are_unique() {
        let mut maker = UuidRequestId;
        let request = Request::new(());
        let a = maker.make_request_id(&request).unwrap();
        let b = maker.make_request_id(&request).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}
