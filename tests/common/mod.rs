//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{HeaderMap, Request, StatusCode};
use tower::ServiceExt;

use restmux::config::ApiConfig;
use restmux::http::HttpServer;
use restmux::lifecycle::build_engine;
use restmux::routing::Router;

pub const ITEMS_PATTERN: &str = r"/items(/)?(?P<key>\w{1,32})?(?P<format>\.\w{1,8})?$";

/// Defaults with an ephemeral port and no metrics exporter.
pub fn test_config() -> ApiConfig {
    let mut config = ApiConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.observability.metrics_enabled = false;
    config
}

pub fn server(config: ApiConfig, routes: Router) -> HttpServer {
    let engine = Arc::new(build_engine(&config).unwrap());
    HttpServer::new(config, engine, Arc::new(routes))
}

/// The fully layered axum router for in-process requests.
pub fn app(config: ApiConfig, routes: Router) -> axum::Router {
    server(config, routes).router()
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Reply {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: &axum::Router, request: Request<Body>) -> Reply {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    Reply {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_accepting(uri: &str, accept: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("accept", accept)
        .body(Body::empty())
        .unwrap()
}

pub fn with_body(method: &str, uri: &str, content_type: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", content_type)
        .body(Body::from(body.to_string()))
        .unwrap()
}
